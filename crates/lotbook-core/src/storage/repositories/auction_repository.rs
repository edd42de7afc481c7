use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use crate::error::Result;
use crate::models::{Auction, AuctionId};

use super::Repository;

pub trait AuctionRepository: Repository<Entity = Auction, Id = AuctionId> {
    /// Insert by URL; returns the existing id when the URL is already known.
    fn insert(&self, url: &str) -> Result<AuctionId>;
    fn update_metadata(
        &self,
        id: AuctionId,
        title: &str,
        auctioneer: &str,
        end_date: &str,
    ) -> Result<()>;
    fn list(&self) -> Result<Vec<Auction>>;
}

pub struct SqliteAuctionRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteAuctionRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_auction(row: &rusqlite::Row) -> rusqlite::Result<Auction> {
        let scraped_raw: String = row.get(5)?;
        Ok(Auction {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            auctioneer: row.get(3)?,
            end_date: row.get(4)?,
            scrape_date: DateTime::parse_from_rfc3339(&scraped_raw)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            item_count: row.get(6)?,
        })
    }
}

impl<'a> Repository for SqliteAuctionRepository<'a> {
    type Entity = Auction;
    type Id = AuctionId;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.url, a.title, a.auctioneer, a.end_date, a.scrape_date, COUNT(i.id)
             FROM auctions a
             LEFT JOIN auction_items i ON i.auction_id = a.id
             WHERE a.id = ?1
             GROUP BY a.id",
        )?;
        match stmt.query_row(params![id], Self::row_to_auction) {
            Ok(auction) => Ok(Some(auction)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, auction: &Self::Entity) -> Result<()> {
        self.conn.execute(
            "UPDATE auctions SET url = ?1, title = ?2, auctioneer = ?3, end_date = ?4 WHERE id = ?5",
            params![
                auction.url,
                auction.title,
                auction.auctioneer,
                auction.end_date,
                auction.id
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: &Self::Id) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM auctions WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

impl<'a> AuctionRepository for SqliteAuctionRepository<'a> {
    fn insert(&self, url: &str) -> Result<AuctionId> {
        self.conn.execute(
            "INSERT OR IGNORE INTO auctions (url, scrape_date) VALUES (?1, ?2)",
            params![url, Utc::now().to_rfc3339()],
        )?;
        let id: AuctionId = self.conn.query_row(
            "SELECT id FROM auctions WHERE url = ?1",
            params![url],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn update_metadata(
        &self,
        id: AuctionId,
        title: &str,
        auctioneer: &str,
        end_date: &str,
    ) -> Result<()> {
        self.conn.execute(
            "UPDATE auctions SET title = ?1, auctioneer = ?2, end_date = ?3 WHERE id = ?4",
            params![title, auctioneer, end_date, id],
        )?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<Auction>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.url, a.title, a.auctioneer, a.end_date, a.scrape_date, COUNT(i.id)
             FROM auctions a
             LEFT JOIN auction_items i ON i.auction_id = a.id
             GROUP BY a.id
             ORDER BY a.scrape_date DESC",
        )?;
        let rows = stmt
            .query_map([], Self::row_to_auction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
