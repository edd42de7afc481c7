use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};

use lotbook_core::{AppConfig, Database, ExitCode, ItemDraft, ProductDraft};
use lotbook_match::MatchError;

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "lotbook",
    about = "Auction-lot catalog: link scraped listings to canonical products",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts and agents).
    /// Also enabled by setting LOTBOOK_JSON=1.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Link every unlinked item to a matching product.
    Link {
        /// Restrict the pass to one auction.
        #[arg(long)]
        auction: Option<i64>,
    },

    /// Scan the catalog for likely duplicate products.
    Dupes {
        /// Override the title similarity threshold.
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Merge duplicate products into a master record.
    Merge {
        master: i64,
        duplicates: Vec<i64>,
        #[arg(long)]
        confirm: bool,
    },

    /// Create or update a product, resolving by id/UPC/ASIN.
    Save {
        #[arg(long)]
        id: Option<i64>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        upc: Option<String>,
        #[arg(long)]
        asin: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        msrp: Option<f64>,
        #[arg(long)]
        target_price: Option<f64>,
        #[arg(long)]
        shipping_cost: Option<f64>,
        #[arg(long)]
        weight_lbs: Option<f64>,
        #[arg(long)]
        weight_oz: Option<f64>,
        #[arg(long)]
        length: Option<f64>,
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
        /// Item ids to link to the saved product.
        #[arg(long, action = clap::ArgAction::Append)]
        link: Vec<i64>,
    },

    /// Operations on a single product.
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },

    /// Auction management.
    Auction {
        #[command(subcommand)]
        action: AuctionAction,
    },

    /// Item management.
    Item {
        #[command(subcommand)]
        action: ItemAction,
    },

    /// List products with no linked items older than the cutoff.
    Orphans {
        #[arg(long)]
        days: Option<i64>,
    },

    /// Show catalog statistics.
    Stats,

    /// Show version information.
    Version,
}

// ─── Product Actions ────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum ProductAction {
    /// Get a product by id.
    Get { id: i64 },

    /// List products.
    List {
        #[arg(long, default_value = "50")]
        limit: usize,
        #[arg(long, default_value = "0")]
        offset: usize,
    },

    /// Delete a product (item links are cleared, items are kept).
    Delete {
        id: i64,
        #[arg(long)]
        confirm: bool,
    },
}

// ─── Auction Actions ────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum AuctionAction {
    /// Register an auction by URL (idempotent).
    Add { url: String },

    /// List auctions with item counts.
    List,

    /// Update scraped auction metadata.
    Update {
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        auctioneer: String,
        #[arg(long)]
        end_date: String,
    },
}

// ─── Item Actions ───────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum ItemAction {
    /// Add a scraped listing to an auction.
    Add {
        auction: i64,
        #[arg(long)]
        lot: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        upc: Option<String>,
        #[arg(long)]
        asin: Option<String>,
        #[arg(long)]
        condition: Option<String>,
        #[arg(long, default_value = "0")]
        bid: f64,
    },

    /// List items in an auction, composed with linked product fields.
    List { auction: i64 },

    /// Record the hammer price for a lot.
    Sold {
        auction: i64,
        lot: String,
        price: f64,
        #[arg(long, default_value = "sold")]
        status: String,
    },
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json || std::env::var("LOTBOOK_JSON").as_deref() == Ok("1");

    // Load config (honors LOTBOOK_DATA_DIR if set)
    let mut config = AppConfig::load()?;
    if let Ok(data_dir) = std::env::var("LOTBOOK_DATA_DIR") {
        config.storage.data_dir = data_dir;
    }

    match cli.command {
        Commands::Link { auction } => {
            let db = open_db(&config)?;
            let linked = lotbook_match::auto_link_with_threshold(
                &db,
                auction,
                config.matching.fuzzy_threshold,
            )?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "linked": linked, "auction": auction },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("Linked {linked} item(s).");
            }
        }

        Commands::Dupes { threshold } => {
            let db = open_db(&config)?;
            let threshold = threshold.unwrap_or(config.matching.fuzzy_threshold);
            let groups = lotbook_match::find_duplicate_groups(&db, threshold)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "groups": groups, "total": groups.len() },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if groups.is_empty() {
                println!("No duplicates found.");
            } else {
                println!("Found {} duplicate group(s):", groups.len());
                for group in &groups {
                    let ids: Vec<String> = group.ids.iter().map(|id| id.to_string()).collect();
                    println!("  [{}]  {}", ids.join(", "), group.reason);
                }
            }
        }

        Commands::Merge {
            master,
            duplicates,
            confirm,
        } => {
            if !confirm {
                eprintln!("Add --confirm to merge and delete duplicate products.");
                std::process::exit(ExitCode::ConfirmRequired as i32);
            }
            let db = open_db(&config)?;
            match lotbook_match::merge_products(&db, master, &duplicates) {
                Ok(()) => {}
                Err(MatchError::ProductNotFound(id)) => {
                    eprintln!("Product not found: {id}");
                    std::process::exit(ExitCode::NotFound as i32);
                }
                Err(e) => return Err(e.into()),
            }
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "master": master, "merged": duplicates },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("Merged {} product(s) into {master}.", duplicates.len());
            }
        }

        Commands::Save {
            id,
            title,
            brand,
            model,
            upc,
            asin,
            category,
            msrp,
            target_price,
            shipping_cost,
            weight_lbs,
            weight_oz,
            length,
            width,
            height,
            notes,
            link,
        } => {
            let db = open_db(&config)?;
            let draft = ProductDraft {
                id,
                title,
                brand,
                model,
                upc,
                asin,
                category,
                msrp,
                target_list_price: target_price,
                shipping_cost_basis: shipping_cost,
                weight_lbs,
                weight_oz,
                length,
                width,
                height,
                notes,
                ..Default::default()
            };

            let saved = match lotbook_match::resolve_and_save(&db, &draft, &link) {
                Ok(id) => id,
                Err(MatchError::DuplicateIdentifier(value)) => {
                    if json_output {
                        let dur = start.elapsed().as_millis();
                        print_json(&serde_json::json!({
                            "status": "error",
                            "error": "duplicate_identifier",
                            "message": format!("Identifier {value} belongs to another product"),
                            "meta": { "duration_ms": dur }
                        }))?;
                    } else {
                        eprintln!("Identifier {value} belongs to another product.");
                    }
                    std::process::exit(ExitCode::Conflict as i32);
                }
                Err(e) => return Err(e.into()),
            };
            let dur = start.elapsed().as_millis();

            if json_output {
                let product = db.get_product(saved)?;
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": product,
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("Saved product {saved}.");
            }
        }

        Commands::Product { action } => match action {
            ProductAction::Get { id } => {
                let db = open_db(&config)?;
                let dur = start.elapsed().as_millis();
                match db.get_product(id) {
                    Ok(product) => {
                        if json_output {
                            print_json(&serde_json::json!({"status":"ok","data":product,"meta":{"duration_ms":dur}}))?;
                        } else {
                            println!("{}", serde_json::to_string_pretty(&product)?);
                        }
                    }
                    Err(_) => {
                        if json_output {
                            print_json(&serde_json::json!({"status":"error","error":"not_found","message":format!("Product {id} not found"),"meta":{"duration_ms":dur}}))?;
                        } else {
                            eprintln!("Product not found: {id}");
                        }
                        std::process::exit(ExitCode::NotFound as i32);
                    }
                }
            }

            ProductAction::List { limit, offset } => {
                let db = open_db(&config)?;
                let products = db.list_products(limit, offset)?;
                let dur = start.elapsed().as_millis();

                if json_output {
                    let total = db.count_products()?;
                    print_json(&serde_json::json!({
                        "status": "ok",
                        "data": { "items": products, "total": total, "limit": limit, "offset": offset },
                        "meta": { "duration_ms": dur }
                    }))?;
                } else if products.is_empty() {
                    println!("No products. Use `lotbook save` to create one.");
                } else {
                    for p in &products {
                        let title = p.title.as_deref().unwrap_or("(untitled)");
                        let brand = p.brand.as_deref().unwrap_or("");
                        println!(
                            "{id:>6}  {title:<45}  {brand:<15}  {items} item(s)",
                            id = p.id,
                            items = p.linked_items,
                        );
                    }
                }
            }

            ProductAction::Delete { id, confirm } => {
                if !confirm {
                    eprintln!("Add --confirm to delete without prompt.");
                    std::process::exit(ExitCode::ConfirmRequired as i32);
                }
                let db = open_db(&config)?;
                db.delete_product(id)?;
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"deleted":id},"meta":{"duration_ms":dur}}))?;
                } else {
                    println!("Deleted product: {id}");
                }
            }
        },

        Commands::Auction { action } => match action {
            AuctionAction::Add { url } => {
                let db = open_db(&config)?;
                let id = db.insert_auction(&url)?;
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"id":id,"url":url},"meta":{"duration_ms":dur}}))?;
                } else {
                    println!("Auction {id}: {url}");
                }
            }

            AuctionAction::List => {
                let db = open_db(&config)?;
                let auctions = db.list_auctions()?;
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"items":auctions,"total":auctions.len()},"meta":{"duration_ms":dur}}))?;
                } else if auctions.is_empty() {
                    println!("No auctions.");
                } else {
                    for a in &auctions {
                        let title = a.title.as_deref().unwrap_or(&a.url);
                        println!("{id:>6}  {title:<50}  {items} item(s)", id = a.id, items = a.item_count);
                    }
                }
            }

            AuctionAction::Update {
                id,
                title,
                auctioneer,
                end_date,
            } => {
                let db = open_db(&config)?;
                db.update_auction_metadata(id, &title, &auctioneer, &end_date)?;
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"id":id},"meta":{"duration_ms":dur}}))?;
                } else {
                    println!("Updated auction {id}.");
                }
            }
        },

        Commands::Item { action } => match action {
            ItemAction::Add {
                auction,
                lot,
                title,
                brand,
                model,
                upc,
                asin,
                condition,
                bid,
            } => {
                let db = open_db(&config)?;
                let draft = ItemDraft {
                    lot,
                    title,
                    brand,
                    model,
                    upc,
                    asin,
                    condition,
                    current_bid: bid,
                    ..Default::default()
                };
                let id = db.insert_item(auction, &draft)?;
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"id":id,"auction":auction},"meta":{"duration_ms":dur}}))?;
                } else {
                    println!("Added item {id} to auction {auction}.");
                }
            }

            ItemAction::List { auction } => {
                let db = open_db(&config)?;
                let views = db.list_item_views(auction)?;
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"items":views,"total":views.len()},"meta":{"duration_ms":dur}}))?;
                } else if views.is_empty() {
                    println!("No items in auction {auction}.");
                } else {
                    for v in &views {
                        let lot = v.lot.as_deref().unwrap_or("-");
                        let title = v.title.as_deref().unwrap_or("(untitled)");
                        let link = v
                            .product_id
                            .map(|p| format!("-> {p}"))
                            .unwrap_or_else(|| "unlinked".to_string());
                        println!("{lot:>6}  {title:<45}  bid {bid:>8.2}  {link}", bid = v.current_bid);
                    }
                }
            }

            ItemAction::Sold {
                auction,
                lot,
                price,
                status,
            } => {
                let db = open_db(&config)?;
                let updated = db.record_final_price(auction, &lot, price, &status)?;
                let dur = start.elapsed().as_millis();
                if updated == 0 {
                    eprintln!("No item with lot {lot} in auction {auction}.");
                    std::process::exit(ExitCode::NotFound as i32);
                }
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"auction":auction,"lot":lot,"sold_price":price},"meta":{"duration_ms":dur}}))?;
                } else {
                    println!("Recorded {price:.2} for lot {lot}.");
                }
            }
        },

        Commands::Orphans { days } => {
            let db = open_db(&config)?;
            let days = days.unwrap_or(config.matching.orphan_age_days);
            let cutoff = chrono::Utc::now() - chrono::Duration::days(days);
            let orphans = db.list_orphan_products(cutoff)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": orphans, "total": orphans.len(), "days": days },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if orphans.is_empty() {
                println!("No orphan products older than {days} day(s).");
            } else {
                println!("{} orphan product(s):", orphans.len());
                for p in &orphans {
                    let title = p.title.as_deref().unwrap_or("(untitled)");
                    println!("{id:>6}  {title}", id = p.id);
                }
            }
        }

        Commands::Stats => {
            let db = open_db(&config)?;
            let stats = db.stats()?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":stats,"meta":{"duration_ms":dur}}))?;
            } else {
                println!("Catalog statistics:");
                println!("  Products:     {}", stats.products);
                println!("  Auctions:     {}", stats.auctions);
                println!("  Items:        {}", stats.items);
                println!("  Linked items: {}", stats.linked_items);
            }
        }

        Commands::Version => {
            let version = env!("CARGO_PKG_VERSION");
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"version":version},"meta":{"duration_ms":dur}}))?;
            } else {
                println!("lotbook v{version}");
            }
        }
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn open_db(config: &AppConfig) -> Result<Database> {
    let db_path = config.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Database::open(&db_path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn save_accepts_physical_and_shipping_flags() {
        let cli = Cli::try_parse_from([
            "lotbook",
            "save",
            "--title",
            "Cast iron skillet",
            "--weight-lbs",
            "8.5",
            "--weight-oz",
            "2",
            "--length",
            "12",
            "--width",
            "12",
            "--height",
            "3",
            "--shipping-cost",
            "14.50",
        ])
        .unwrap();

        match cli.command {
            Commands::Save {
                weight_lbs,
                weight_oz,
                length,
                width,
                height,
                shipping_cost,
                ..
            } => {
                assert_eq!(weight_lbs, Some(8.5));
                assert_eq!(weight_oz, Some(2.0));
                assert_eq!(length, Some(12.0));
                assert_eq!(width, Some(12.0));
                assert_eq!(height, Some(3.0));
                assert_eq!(shipping_cost, Some(14.50));
            }
            _ => panic!("expected save command"),
        }
    }
}
