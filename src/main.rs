// src/main.rs
// DOCUMENTATION: Command-line entry point
// PURPOSE: Initialize config and logging, log in, and drive the sync operations

use anyhow::{bail, Context};
use offered_places::config::{self, Config};
use offered_places::models::parse_wire_date;
use offered_places::{
    AuthSession, NewPlace, Place, PlaceEdit, PlaceLocation, PlaceStore, PlaceSyncService,
    PlacesError,
};
use std::env;
use std::sync::Arc;

// --- ANSI colors ---
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";

const USAGE: &str = "usage: places <command>

commands:
  signup                              create the account in PLACES_EMAIL / PLACES_PASSWORD
  list                                fetch and print every offered place
  mine                                print the places owned by the logged-in user
  show <id>                           fetch one place
  update <id> <title> <desc> <price>  edit a place
  create <title> <desc> <price> <from> <to> <lat> <lng> <address> <image-url>
  upload <file>                       upload an image and print its url";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Auth and validation failures carry a message meant for humans
        match e.downcast_ref::<PlacesError>() {
            Some(places_error) => eprintln!("{}[ERROR] {}{}", RED, places_error.user_message(), RESET),
            None => eprintln!("{}[ERROR] {:#}{}", RED, e, RESET),
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // 1. Load configuration
    let config = Config::from_env();
    config.validate()?;

    // 2. Initialize logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", &config.log_level);
    }
    env_logger::init();

    log::info!("Environment: {}", config.environment);

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        println!("{}", USAGE);
        return Ok(());
    };

    // 3. Wire session, store and sync service
    let client = config::init_http_client(&config)?;
    let session = Arc::new(AuthSession::from_config(client.clone(), &config));
    let store = PlaceStore::new();
    let sync = PlaceSyncService::from_config(client, &config, Arc::clone(&session), store);

    let email = env::var("PLACES_EMAIL").context("PLACES_EMAIL must be set")?;
    let password = env::var("PLACES_PASSWORD").context("PLACES_PASSWORD must be set")?;

    if command == "signup" {
        let created = session.signup(&email, &password).await?;
        println!("{}[OK] Account created for {} ({}){}", GREEN, created.email, created.user_id, RESET);
        return Ok(());
    }

    session.login(&email, &password).await?;

    match (command, &args[1..]) {
        ("list", []) => {
            let places = sync.fetch_all().await?;
            print_places("Offered places", &places);
        }
        ("mine", []) => {
            sync.fetch_all().await?;
            let user_id = session.user_id().context("session ended")?;
            print_places("Your offers", &sync.offers_of(&user_id));
        }
        ("show", [id]) => {
            let place = sync.fetch_one(id).await?;
            print_places("Place", std::slice::from_ref(&place));
        }
        ("update", [id, title, description, price]) => {
            let price: f64 = price.parse().context("price must be a number")?;
            let place = sync
                .update(id, PlaceEdit::new(title.as_str(), description.as_str(), price))
                .await?;
            println!("{}[OK] Updated {}{}", GREEN, place.id, RESET);
        }
        ("create", [title, description, price, from, to, lat, lng, address, image_url]) => {
            let new_place = NewPlace {
                title: title.clone(),
                description: description.clone(),
                price: price.parse().context("price must be a number")?,
                available_from: parse_wire_date(from).context("invalid <from> date")?,
                available_to: parse_wire_date(to).context("invalid <to> date")?,
                location: PlaceLocation {
                    lat: lat.parse().context("lat must be a number")?,
                    lng: lng.parse().context("lng must be a number")?,
                    address: address.clone(),
                    static_map_image_url: None,
                },
                image_url: image_url.clone(),
            };
            let place = sync.create(new_place).await?;
            println!("{}[OK] Created {}{}", GREEN, place.id, RESET);
        }
        ("upload", [path]) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("reading {}", path))?;
            let file_name = std::path::Path::new(path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("image");
            let upload = sync.upload_image(file_name, bytes).await?;
            println!("{}[OK] {}{}", GREEN, upload.image_url, RESET);
        }
        _ => bail!("unknown command or wrong arguments\n\n{}", USAGE),
    }

    session.logout();
    Ok(())
}

fn print_places(header: &str, places: &[Place]) {
    println!("\n{}{} ({}){}", BOLD, header, places.len(), RESET);
    println!("{}", "-".repeat(62));
    for place in places {
        println!(
            "{}{:<22}{} {:<28} {:>9.2}  {} -> {}",
            CYAN,
            place.id,
            RESET,
            place.title,
            place.price,
            place.available_from.format("%Y-%m-%d"),
            place.available_to.format("%Y-%m-%d"),
        );
        println!("  {} | {}", place.location.address, place.description);
    }
}
