//! Synthetic allocation workload for demo runs.
//!
//! Keeps a rolling population of tracked objects alive so repeated dumps
//! show modules, classes, functions, instances, and containers with real
//! churn between captures.

use std::sync::Arc;

use heaplens::{
    global_registry, ClassDef, CodeUnit, DynObject, FunctionDef, ListObject, MethodDef, ModuleDef,
    ObjRef, Value,
};

const MAX_ITEMS: usize = 32;
const CATALOG_CAP: usize = 64;

/// Rolling inventory of tracked objects.
pub struct Workload {
    item_class: Arc<ClassDef>,
    catalog: Arc<ListObject>,
    items: Vec<Arc<DynObject>>,
    serial: u64,
}

impl Workload {
    /// Registers the inventory module and seeds the first batch of items.
    pub fn start() -> Self {
        let registry = global_registry();

        let restock = registry.alloc(FunctionDef::new("restock", CodeUnit::here("restock")));
        let audit = registry.alloc(FunctionDef::new("audit", CodeUnit::here("audit")));

        let mut class = ClassDef::new("Item", "inventory");
        class.set_constructor(Arc::new(CodeUnit::here("Item::new")));
        let describe = registry.alloc(MethodDef::new("describe", CodeUnit::here("Item::describe")));
        class.bind("describe", Value::Ref(ObjRef::new(describe)));
        class.bind("SHELF_LIFE_DAYS", Value::Int(90));
        let item_class = registry.alloc(class);

        let mut module = ModuleDef::new("inventory", file!());
        module.bind("Item", Value::Ref(ObjRef::new(item_class.clone())));
        module.bind("restock", Value::Ref(ObjRef::new(restock)));
        module.bind("audit", Value::Ref(ObjRef::new(audit)));
        registry.load_module(module);

        let catalog = registry.alloc(ListObject::new());

        let mut workload = Self {
            item_class,
            catalog,
            items: Vec::new(),
            serial: 0,
        };
        for _ in 0..8 {
            workload.spawn_item();
        }
        workload
    }

    /// One round of churn: a few items arrive, the oldest fall away, and
    /// a freshly computed score lands on the newest item.
    pub fn tick(&mut self) {
        for _ in 0..3 {
            self.spawn_item();
        }
        while self.items.len() > MAX_ITEMS {
            self.items.remove(0);
        }

        let mut score = 0.0;
        for n in 0..500u32 {
            score += f64::from(n).sqrt();
        }
        if let Some(newest) = self.items.last() {
            newest.set("audit_score", Value::Float(score));
        }
    }

    /// Number of items currently held live.
    pub fn live_items(&self) -> usize {
        self.items.len()
    }

    fn spawn_item(&mut self) {
        self.serial += 1;
        let registry = global_registry();

        let item = registry.alloc(DynObject::new(Some(self.item_class.clone())));
        item.set("sku", Value::Int(self.serial as i64));
        item.set("name", Value::Str(format!("item-{}", self.serial)));
        item.set("price", Value::Decimal(format!("{}.99", 4 + self.serial % 20)));
        item.set("catalog", Value::Ref(ObjRef::new(self.catalog.clone())));

        if self.serial % 5 == 0 {
            item.set("notes", Value::Str("restock pending ".repeat(80)));
        }
        if self.serial % 7 == 0 {
            item.set(
                "fingerprint",
                Value::Bytes(self.serial.to_be_bytes().to_vec()),
            );
        }
        if self.serial % 11 == 0 {
            item.set(
                "reorder_points",
                Value::Range {
                    start: 0,
                    stop: self.serial as i64,
                    step: 25,
                },
            );
        }

        self.catalog.push(Value::Str(format!("item-{}", self.serial)));
        while self.catalog.len() > CATALOG_CAP {
            self.catalog.pop_front();
        }

        self.items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workload_seeds_and_churns() {
        let mut workload = Workload::start();
        assert_eq!(workload.live_items(), 8);

        for _ in 0..20 {
            workload.tick();
        }
        assert_eq!(workload.live_items(), MAX_ITEMS);
        assert!(workload.catalog.len() <= CATALOG_CAP);
    }
}
