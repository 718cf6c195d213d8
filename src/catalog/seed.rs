//! Seed data for the furniture catalog.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::{Category, Money, Product, ProductError, Review, Role, User};

const UNSPLASH: &str = "https://images.unsplash.com";

/// Monthly sales point shown on the admin overview
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SalesPoint {
    pub month: &'static str,
    pub sales: u64,
}

pub fn users() -> Vec<User> {
    vec![
        User::new("1", "Demo User", "user@example.com", Role::User).with_avatar("https://i.pravatar.cc/150?u=user"),
        User::new("2", "Admin User", "admin@example.com", Role::Admin).with_avatar("https://i.pravatar.cc/150?u=admin"),
        User::new("3", "Sarah Johnson", "sarah@example.com", Role::User).with_avatar("https://i.pravatar.cc/150?u=sarah"),
        User::new("4", "Michael Brown", "michael@example.com", Role::User).with_avatar("https://i.pravatar.cc/150?u=michael"),
    ]
}

pub fn categories() -> Result<Vec<Category>, ProductError> {
    [
        ("1", "Living Room", "photo-1616486338812-3dadae4b4ace"),
        ("2", "Bedroom", "photo-1616594039964-ae9021a400a0"),
        ("3", "Dining", "photo-1615968679312-9b7ed9f04e79"),
        ("4", "Office", "photo-1524758631624-e2822e304c36"),
        ("5", "Outdoor", "photo-1600210492493-0946911123ea"),
        ("6", "Decor", "photo-1586023492125-27b2c045efd7"),
    ]
    .into_iter()
    .map(|(id, name, photo)| Ok(Category::new(id, name)?.with_image(format!("{}/{}", UNSPLASH, photo))))
    .collect()
}

fn reviews(users: &[User]) -> Result<Vec<Review>, ProductError> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    Ok(vec![
        Review::new("1", "I love this piece of furniture! It's exactly as described and looks amazing in my living room.", 5, users[2].clone(), date(2023, 12, 1), true)?,
        Review::new("2", "Good quality and comfortable. The color is slightly different than in the photos, but still looks great.", 4, users[0].clone(), date(2023, 11, 15), true)?,
        Review::new("3", "Fantastic furniture, quick shipping, and easy assembly. Highly recommend!", 5, users[3].clone(), date(2023, 10, 28), true)?,
        Review::new("4", "It's okay but took longer than expected to ship. Quality is good though.", 3, users[2].clone(), date(2023, 9, 20), false)?,
    ])
}

struct Seed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    price: i64,
    category: usize,
    photos: [&'static str; 2],
    stock: u32,
    rating: f32,
    reviews: [usize; 2],
}

const PRODUCTS: [Seed; 8] = [
    Seed { id: "1", name: "Modern Leather Sofa", description: "Elegant modern sofa with genuine leather upholstery, perfect for contemporary living spaces.", price: 1299, category: 0, photos: ["photo-1540574163026-643ea20ade25", "photo-1550254478-ead40cc3b1b9"], stock: 15, rating: 4.5, reviews: [0, 1] },
    Seed { id: "2", name: "Wooden Coffee Table", description: "Handcrafted coffee table made from reclaimed wood, adding a rustic charm to any living space.", price: 449, category: 0, photos: ["photo-1567538096630-e0c55bd6374c", "photo-1608909322671-f8e5eda9f033"], stock: 23, rating: 4.8, reviews: [2, 0] },
    Seed { id: "3", name: "King Size Platform Bed", description: "Minimalist king-size platform bed with built-in storage drawers and a sleek headboard.", price: 899, category: 1, photos: ["photo-1505693416388-ac5ce068fe85", "photo-1522771739844-6a9f6d5f14af"], stock: 10, rating: 4.6, reviews: [1, 2] },
    Seed { id: "4", name: "Ergonomic Office Chair", description: "Premium ergonomic office chair with adjustable lumbar support and breathable mesh back.", price: 349, category: 3, photos: ["photo-1571722288749-921772083966", "photo-1580480055273-228ff5388ef8"], stock: 32, rating: 4.7, reviews: [3, 2] },
    Seed { id: "5", name: "Dining Table Set", description: "Six-seater dining table set with solid wood construction and comfortable upholstered chairs.", price: 1199, category: 2, photos: ["photo-1617098591651-ad3807d60c1b", "photo-1631679706909-1844bbd07221"], stock: 8, rating: 4.3, reviews: [0, 3] },
    Seed { id: "6", name: "Outdoor Lounge Set", description: "Weather-resistant outdoor lounge set with comfortable cushions and a sleek modern design.", price: 1699, category: 4, photos: ["photo-1598300042247-d088f8ab3a91", "photo-1600607686527-6fb886090705"], stock: 5, rating: 4.9, reviews: [2, 1] },
    Seed { id: "7", name: "Decorative Wall Mirror", description: "Elegant round wall mirror with ornate metal frame, perfect for enhancing any room.", price: 249, category: 5, photos: ["photo-1618220179428-22790b461013", "photo-1622547748225-3fc4abd2cca0"], stock: 18, rating: 4.4, reviews: [3, 0] },
    Seed { id: "8", name: "Bookshelf with Storage", description: "Versatile bookshelf with multiple shelves and cabinets for efficient storage and display.", price: 599, category: 0, photos: ["photo-1594620302200-9a762244a156", "photo-1588254057341-387a318ca6ca"], stock: 12, rating: 4.5, reviews: [1, 2] },
];

pub fn products(categories: &[Category], users: &[User]) -> Result<Vec<Product>, ProductError> {
    let reviews = reviews(users)?;
    let seller = &users[1];
    PRODUCTS
        .iter()
        .map(|seed| {
            let product = Product::create(seed.name, Money::usd(Decimal::new(seed.price, 0)), categories[seed.category].clone(), seller.clone())?
                .with_id(seed.id)
                .with_description(seed.description)
                .with_images(seed.photos.iter().map(|p| format!("{}/{}", UNSPLASH, p)).collect())
                .with_stock(seed.stock)
                .with_rating(seed.rating)
                .with_reviews(seed.reviews.iter().map(|&i| reviews[i].clone()).collect());
            product.validate()?;
            Ok(product)
        })
        .collect()
}

pub fn sales_series() -> Vec<SalesPoint> {
    [
        ("2023-01", 12500), ("2023-02", 15000), ("2023-03", 18000), ("2023-04", 16800),
        ("2023-05", 21000), ("2023-06", 19500), ("2023-07", 22500), ("2023-08", 25000),
        ("2023-09", 27800), ("2023-10", 24500), ("2023-11", 29000), ("2023-12", 34500),
    ]
    .into_iter()
    .map(|(month, sales)| SalesPoint { month, sales })
    .collect()
}
