//! In-memory inventory served over REST
//!
//! Run with:
//!
//! ```text
//! cargo run --example inventory
//! ```
//!
//! Then try:
//!
//! ```text
//! curl localhost:8080/items
//! curl localhost:8080/items/page/1
//! curl localhost:8080/items/sku-1/movements
//! curl -X POST localhost:8080/items/filter -H 'content-type: application/json' \
//!      -d '{"name":"bolt","quantity":0}'
//! curl -X POST localhost:8080/items -H 'x-role: clerk' -H 'content-type: application/json' \
//!      -d '{"name":"washer","quantity":500}'
//! curl -X DELETE localhost:8080/items/sku-2 -H 'x-role: manager'
//! ```
//!
//! Anyone may read. Clerks may create and update; only managers may delete.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use acton_rest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
struct Item {
    sku: String,
    name: String,
    quantity: u32,
    unit_cost_cents: u64,
    movements: Vec<Movement>,
}

#[derive(Debug, Clone, Serialize)]
struct Movement {
    delta: i64,
    reason: String,
}

/// Public shape of an item; cost and history stay internal
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ItemDto {
    #[serde(default)]
    sku: Option<String>,
    name: String,
    quantity: u32,
}

impl From<&Item> for ItemDto {
    fn from(item: &Item) -> Self {
        Self {
            sku: Some(item.sku.clone()),
            name: item.name.clone(),
            quantity: item.quantity,
        }
    }
}

#[derive(Default)]
struct Inventory {
    items: RwLock<BTreeMap<String, Item>>,
    // SKUs are never reused, even after a delete
    last_sku: AtomicU64,
}

const PAGE_SIZE: u32 = 2;

impl Inventory {
    fn seeded() -> Self {
        let inventory = Self::default();
        for (name, quantity, cost) in [("bolt", 120, 15), ("nut", 300, 5), ("bracket", 12, 240)] {
            if let Err(e) = inventory.insert(name.to_string(), quantity, cost) {
                tracing::error!("Failed to seed {}: {}", name, e);
            }
        }
        inventory
    }

    fn get(&self, sku: &str) -> Option<Item> {
        self.items.read().ok()?.get(sku).cloned()
    }

    fn all(&self) -> Vec<Item> {
        self.items
            .read()
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default()
    }

    fn page(&self, page: i64) -> Page<Item> {
        let Ok(items) = self.items.read() else {
            return Page::empty(page, PAGE_SIZE);
        };
        let offset = usize::try_from(Page::<Item>::offset_of(page, PAGE_SIZE)).unwrap_or(usize::MAX);
        let slice = items
            .values()
            .skip(offset)
            .take(PAGE_SIZE as usize)
            .cloned()
            .collect();
        Page::new(slice, page, PAGE_SIZE, items.len() as u64)
    }

    fn matching(&self, filter: &ItemDto) -> Vec<Item> {
        self.all()
            .into_iter()
            .filter(|item| item.name.contains(&filter.name))
            .filter(|item| item.quantity >= filter.quantity)
            .collect()
    }

    fn insert(&self, name: String, quantity: u32, unit_cost_cents: u64) -> anyhow::Result<Item> {
        let mut items = self
            .items
            .write()
            .map_err(|_| anyhow::anyhow!("inventory lock poisoned"))?;
        let sku = format!("sku-{}", self.last_sku.fetch_add(1, Ordering::Relaxed) + 1);
        let item = Item {
            sku: sku.clone(),
            name,
            quantity,
            unit_cost_cents,
            movements: vec![Movement {
                delta: i64::from(quantity),
                reason: "initial stock".to_string(),
            }],
        };
        items.insert(sku, item.clone());
        Ok(item)
    }

    fn adjust(&self, mut item: Item, patch: ItemDto) -> anyhow::Result<Item> {
        let delta = i64::from(patch.quantity) - i64::from(item.quantity);
        item.name = patch.name;
        item.quantity = patch.quantity;
        item.movements.push(Movement {
            delta,
            reason: "adjustment".to_string(),
        });

        self.items
            .write()
            .map_err(|_| anyhow::anyhow!("inventory lock poisoned"))?
            .insert(item.sku.clone(), item.clone());
        Ok(item)
    }

    fn remove(&self, item: Item) -> anyhow::Result<Item> {
        self.items
            .write()
            .map_err(|_| anyhow::anyhow!("inventory lock poisoned"))?
            .remove(&item.sku)
            .ok_or_else(|| anyhow::anyhow!("item {} already removed", item.sku))
    }
}

fn permitted(ctx: &RequestContext, action: Action, _items: &[Item]) -> bool {
    let role = ctx.header("x-role").unwrap_or("anonymous");
    match action {
        Action::GetAll | Action::GetOne => true,
        Action::Create | Action::Mutate => matches!(role, "clerk" | "manager"),
        Action::Delete => role == "manager",
    }
}

fn items_resource(inventory: Arc<Inventory>) -> Result<Resource<Item, ItemDto>> {
    let find = inventory.clone();
    let all = inventory.clone();
    let page = inventory.clone();
    let search = inventory.clone();
    let create = inventory.clone();
    let mutate = inventory.clone();
    let delete = inventory;

    Resource::<Item, ItemDto>::builder("items")
        .find(move |sku| find.get(sku))
        .find_all(move || all.all())
        .find_all_paged(move |token| page.page(token))
        .search(move |filter| search.matching(&filter))
        .create(move |dto| create.insert(dto.name, dto.quantity, 0))
        .mutate(move |item, patch| mutate.adjust(item, patch))
        .delete(move |item| delete.remove(item))
        .sub_entity(SubEntity::new("movements", |item: &Item| item.movements.clone()))
        .to_dto(|item| ItemDto::from(item))
        .authorize(permitted)
        .build()
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_for_service("inventory")?;
    init_tracing(&config)?;

    let inventory = Arc::new(Inventory::seeded());
    let valuation: u64 = inventory
        .all()
        .iter()
        .map(|item| item.unit_cost_cents * u64::from(item.quantity))
        .sum();
    tracing::info!(valuation_cents = valuation, "Inventory seeded");

    let app = register(Router::new(), items_resource(inventory)?);

    Server::new(config).serve(app).await
}
