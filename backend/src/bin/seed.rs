//! Database seeding: admin account, categories, suppliers and sample
//! parts with their opening stock movements. Safe to run repeatedly;
//! existing rows are left untouched.
//!
//! Usage: DATABASE_URL=postgres://... cargo run --bin seed

use bcrypt::hash;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

struct SeedPart {
    code: &'static str,
    name: &'static str,
    description: &'static str,
    brand: &'static str,
    model: &'static str,
    year: &'static str,
    price: &'static str,
    cost_price: &'static str,
    stock: i32,
    min_stock: i32,
    location: &'static str,
    category: &'static str,
    supplier_cnpj: &'static str,
}

const CATEGORIES: &[(&str, &str)] = &[
    ("Motor", "Peças relacionadas ao motor do veículo"),
    ("Freios", "Sistema de freios e componentes"),
    ("Suspensão", "Amortecedores, molas e componentes da suspensão"),
    ("Elétrica", "Componentes elétricos e eletrônicos"),
    ("Transmissão", "Câmbio, embreagem e transmissão"),
    ("Carroceria", "Peças da carroceria e acabamento"),
];

const SUPPLIERS: &[(&str, &str, &str, &str, &str, &str)] = &[
    (
        "AutoPeças Brasil Ltda",
        "contato@autopecasbrasil.com.br",
        "11999887766",
        "Rua das Peças, 123 - São Paulo, SP",
        "12345678000195",
        "João Silva",
    ),
    (
        "Distribuidora Central",
        "vendas@distribuidoracentral.com.br",
        "11888776655",
        "Av. Industrial, 456 - São Paulo, SP",
        "98765432000198",
        "Maria Santos",
    ),
    (
        "Peças & Cia",
        "info@pecasecia.com.br",
        "11777665544",
        "Rua do Comércio, 789 - São Paulo, SP",
        "11223344000186",
        "Pedro Oliveira",
    ),
];

const PARTS: &[SeedPart] = &[
    SeedPart {
        code: "VLV001",
        name: "Válvula de Admissão",
        description: "Válvula de admissão para motores 1.0 e 1.4",
        brand: "Mahle",
        model: "Gol/Palio",
        year: "2010-2020",
        price: "45.90",
        cost_price: "32.50",
        stock: 25,
        min_stock: 5,
        location: "A1-B2",
        category: "Motor",
        supplier_cnpj: "12345678000195",
    },
    SeedPart {
        code: "PST001",
        name: "Pastilha de Freio Dianteira",
        description: "Pastilha de freio dianteira cerâmica",
        brand: "Bosch",
        model: "Civic/Corolla",
        year: "2015-2023",
        price: "89.90",
        cost_price: "65.00",
        stock: 15,
        min_stock: 3,
        location: "B2-C1",
        category: "Freios",
        supplier_cnpj: "98765432000198",
    },
    SeedPart {
        code: "AMT001",
        name: "Amortecedor Dianteiro",
        description: "Amortecedor dianteiro a gás",
        brand: "Monroe",
        model: "Uno/Palio",
        year: "2008-2018",
        price: "125.50",
        cost_price: "95.00",
        stock: 8,
        min_stock: 2,
        location: "C1-D3",
        category: "Suspensão",
        supplier_cnpj: "11223344000186",
    },
    SeedPart {
        code: "VEL001",
        name: "Vela de Ignição",
        description: "Vela de ignição com eletrodo de irídio",
        brand: "NGK",
        model: "Onix/HB20",
        year: "2013-2024",
        price: "32.90",
        cost_price: "21.00",
        stock: 40,
        min_stock: 10,
        location: "A2-B1",
        category: "Motor",
        supplier_cnpj: "12345678000195",
    },
    SeedPart {
        code: "BAT001",
        name: "Bateria 60Ah",
        description: "Bateria selada livre de manutenção",
        brand: "Moura",
        model: "Universal",
        year: "",
        price: "389.90",
        cost_price: "290.00",
        stock: 6,
        min_stock: 2,
        location: "D1-A1",
        category: "Elétrica",
        supplier_cnpj: "98765432000198",
    },
    SeedPart {
        code: "DSC001",
        name: "Disco de Freio Ventilado",
        description: "Par de discos de freio ventilados",
        brand: "Fremax",
        model: "Civic/Corolla",
        year: "2015-2023",
        price: "210.00",
        cost_price: "150.00",
        stock: 12,
        min_stock: 4,
        location: "B3-C2",
        category: "Freios",
        supplier_cnpj: "98765432000198",
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("APM__DATABASE__URL"))
        .expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    tracing::info!("Seeding database...");

    seed_admin(&pool).await?;
    seed_categories(&pool).await?;
    seed_suppliers(&pool).await?;
    seed_parts(&pool).await?;

    tracing::info!("Seed completed");
    Ok(())
}

async fn seed_admin(pool: &PgPool) -> anyhow::Result<()> {
    let password_hash = hash("admin123", 12)?;

    let inserted = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO users (email, password_hash, name, role)
        VALUES ($1, $2, $3, 'ADMIN')
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind("admin@autopecas.com")
    .bind(&password_hash)
    .bind("Administrador")
    .fetch_optional(pool)
    .await?;

    match inserted {
        Some(id) => tracing::info!(%id, "admin user created"),
        None => tracing::info!("admin user already present"),
    }
    Ok(())
}

async fn seed_categories(pool: &PgPool) -> anyhow::Result<()> {
    let mut created = 0;
    for (name, description) in CATEGORIES {
        let inserted = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_optional(pool)
        .await?;
        if inserted.is_some() {
            created += 1;
        }
    }
    tracing::info!(created, total = CATEGORIES.len(), "categories seeded");
    Ok(())
}

async fn seed_suppliers(pool: &PgPool) -> anyhow::Result<()> {
    let mut created = 0;
    for (name, email, phone, address, cnpj, contact) in SUPPLIERS {
        let inserted = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO suppliers (name, email, phone, address, cnpj, contact)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (cnpj) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(address)
        .bind(cnpj)
        .bind(contact)
        .fetch_optional(pool)
        .await?;
        if inserted.is_some() {
            created += 1;
        }
    }
    tracing::info!(created, total = SUPPLIERS.len(), "suppliers seeded");
    Ok(())
}

async fn seed_parts(pool: &PgPool) -> anyhow::Result<()> {
    let mut created = 0;
    for part in PARTS {
        let category_id =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM categories WHERE name = $1")
                .bind(part.category)
                .fetch_one(pool)
                .await?;
        let supplier_id =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM suppliers WHERE cnpj = $1")
                .bind(part.supplier_cnpj)
                .fetch_one(pool)
                .await?;

        let year = (!part.year.is_empty()).then_some(part.year);

        // RETURNING only fires on actual insert, so the opening movement
        // is recorded exactly once
        let inserted = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO parts (code, name, description, brand, model, year, price, cost_price,
                               stock, min_stock, location, category_id, supplier_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (code) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(part.code)
        .bind(part.name)
        .bind(part.description)
        .bind(part.brand)
        .bind(part.model)
        .bind(year)
        .bind(Decimal::from_str(part.price)?)
        .bind(Decimal::from_str(part.cost_price)?)
        .bind(part.stock)
        .bind(part.min_stock)
        .bind(part.location)
        .bind(category_id)
        .bind(supplier_id)
        .fetch_optional(pool)
        .await?;

        if let Some(part_id) = inserted {
            if part.stock > 0 {
                sqlx::query(
                    r#"
                    INSERT INTO stock_movements (part_id, movement_type, quantity, reason)
                    VALUES ($1, 'IN', $2, 'Estoque inicial')
                    "#,
                )
                .bind(part_id)
                .bind(part.stock)
                .execute(pool)
                .await?;
            }
            created += 1;
        }
    }
    tracing::info!(created, total = PARTS.len(), "parts seeded");
    Ok(())
}
