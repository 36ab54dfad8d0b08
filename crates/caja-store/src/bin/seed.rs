//! # Seed Data Generator
//!
//! Populates a data directory with a demo catalog, cashier logins and a
//! couple of credit customers.
//!
//! ## Usage
//! ```bash
//! # Seed ./datos with the default catalog
//! cargo run -p caja-store --bin seed
//!
//! # Limit the number of products
//! cargo run -p caja-store --bin seed -- --count 40
//!
//! # Choose the data directory
//! cargo run -p caja-store --bin seed -- --dir /var/lib/caja
//! ```
//!
//! ## Generated Data
//! - Unit products per category, code `{CATEGORY}{INDEX}` (e.g. `BEB3`)
//! - Weighable produce priced per kilogram (`VER1`, ...)
//! - Expiry dates spread over the next 90 days, some already past
//! - Users `cajero_1` / `1234` and `encargado` / `admin`
//! - Customers `Juan Perez` (VIP) and `Maria Gomez`

use chrono::{Days, Local, NaiveDate};
use std::env;

use caja_core::customer::Customer;
use caja_core::session::Credential;
use caja_core::{DiscountRate, Money, Product};
use caja_store::{Store, StoreConfig};

/// Unit-counted products per category, with a base price in cents.
const CATEGORIES: &[(&str, &[(&str, i64)])] = &[
    (
        "BEB",
        &[
            ("Coca Cola 500ml", 1500),
            ("Agua mineral 500ml", 800),
            ("Jugo de naranja 1L", 1800),
            ("Cerveza lata 473ml", 2200),
            ("Soda sifon 1.5L", 1100),
            ("Gaseosa lima limon 2.25L", 2600),
        ],
    ),
    (
        "ALM",
        &[
            ("Yerba mate 1kg", 4500),
            ("Fideos spaghetti 500g", 1300),
            ("Arroz largo fino 1kg", 1900),
            ("Aceite girasol 1.5L", 3800),
            ("Azucar 1kg", 1400),
            ("Harina 000 1kg", 1000),
            ("Pure de tomate 520g", 900),
        ],
    ),
    (
        "GOL",
        &[
            ("Alfajor triple chocolate", 1000),
            ("Chocolate con leche 100g", 2100),
            ("Caramelos surtidos", 300),
            ("Galletitas de agua", 1200),
            ("Chicle menta", 400),
        ],
    ),
    (
        "LAC",
        &[
            ("Leche entera 1L", 1250),
            ("Yogur frutilla 190g", 950),
            ("Manteca 200g", 2300),
            ("Queso crema 290g", 2700),
            ("Dulce de leche 400g", 2900),
        ],
    ),
];

/// Weighable produce, price per kilogram in cents.
const PRODUCE: &[(&str, i64)] = &[
    ("Banana", 400),
    ("Manzana roja", 550),
    ("Papa", 300),
    ("Tomate perita", 700),
    ("Queso cremoso (feteado)", 6500),
    ("Jamon cocido (feteado)", 8900),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = usize::MAX;
    let mut data_dir = String::from("./datos");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(usize::MAX);
                    i += 1;
                }
            }
            "--dir" | "-d" => {
                if i + 1 < args.len() {
                    data_dir = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Caja Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Maximum number of products (default: all)");
                println!("  -d, --dir <PATH>   Data directory (default: ./datos)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Caja Seed Data Generator");
    println!("========================");
    println!("Data directory: {}", data_dir);
    println!();

    let store = Store::open(StoreConfig::new(&data_dir)).await?;
    println!("✓ Data directory ready");

    // Check existing products
    let existing = store.products().count().await?;
    if existing > 0 {
        println!("⚠ Catalog already has {} products", existing);
        println!("  Skipping seed to avoid overwriting it.");
        println!("  Delete {} to regenerate.", caja_store::repository::product::FILE_NAME);
        return Ok(());
    }

    let today = Local::now().date_naive();
    let catalog: Vec<Product> = generate_catalog(today).into_iter().take(count).collect();
    store.products().save_all(&catalog).await?;
    println!("✓ Generated {} products", catalog.len());

    if store.users().all().await?.is_empty() {
        store
            .users()
            .replace_all(&[
                Credential {
                    username: "cajero_1".to_string(),
                    password: "1234".to_string(),
                },
                Credential {
                    username: "encargado".to_string(),
                    password: "admin".to_string(),
                },
            ])
            .await?;
        println!("✓ Created users cajero_1, encargado");
    }

    let created = store
        .customers()
        .update(|book| {
            let mut created = 0;
            for customer in [
                Customer::new("Juan Perez", Some("30111222".to_string()), true),
                Customer::new("Maria Gomez", None, false),
            ] {
                if caja_core::customer::add_customer(book, customer).is_ok() {
                    created += 1;
                }
            }
            Ok::<_, caja_store::StoreError>(created)
        })
        .await?;
    println!("✓ Created {} customers", created);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds the demo catalog with deterministic stock, costs and dates.
fn generate_catalog(today: NaiveDate) -> Vec<Product> {
    let mut products = Vec::new();
    let mut seed: usize = 0;

    for (category, items) in CATEGORIES {
        for (index, (description, price)) in items.iter().enumerate() {
            seed += 1;
            let mut product = Product::new(
                format!("{}{}", category, index + 1),
                *description,
                Money::from_cents(*price),
                false,
            );
            product.stock_quantity = ((seed * 7) % 40 + 5) as f64;
            // Cost 60-79% of price
            product.cost = Some(Money::from_cents(*price * (60 + (seed % 20) as i64) / 100));
            product.ingress_date = Some(today);
            product.expiry_date = expiry_for(today, seed);
            if seed % 9 == 0 {
                product.discount = DiscountRate::from_bps(1000);
            }
            products.push(product);
        }
    }

    for (index, (description, price)) in PRODUCE.iter().enumerate() {
        seed += 1;
        let mut product = Product::new(
            format!("VER{}", index + 1),
            *description,
            Money::from_cents(*price),
            true,
        );
        // Kilograms on hand
        product.stock_quantity = ((seed * 3) % 20 + 2) as f64;
        product.ingress_date = Some(today);
        product.expiry_date = today.checked_add_days(Days::new(3 + (seed % 5) as u64));
        products.push(product);
    }

    products
}

/// Every fifth product is already past its date, the rest spread over 90 days.
fn expiry_for(today: NaiveDate, seed: usize) -> Option<NaiveDate> {
    if seed % 5 == 0 {
        today.checked_sub_days(Days::new(2))
    } else {
        today.checked_add_days(Days::new(((seed * 13) % 90) as u64))
    }
}
