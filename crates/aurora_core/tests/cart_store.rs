use aurora_core::stores::cart::CartStore;
use aurora_core::stores::CART_KEY;
use aurora_core::{
    Cart, CartItem, EventBus, MemoryStorage, StorageAdapter, StorageBackend, Topic, UiEvent,
};
use std::sync::{Arc, Mutex};

fn new_store(backend: &Arc<MemoryStorage>) -> CartStore {
    CartStore::new(&StorageAdapter::new(backend.clone()), &EventBus::new())
}

fn stored_cart(backend: &MemoryStorage) -> serde_json::Value {
    let raw = backend.get_item(CART_KEY).unwrap().expect("cart key present");
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn empty_storage_hydrates_empty_item_list() {
    let backend = Arc::new(MemoryStorage::new());
    let store = new_store(&backend);
    assert_eq!(store.get(), Cart::default());
    assert!(store.get().items.is_empty());
}

#[test]
fn corrupt_or_null_storage_hydrates_empty_item_list() {
    for raw in ["null", "{\"items\":null}", "{]", "[]", "\"cart\""] {
        let backend = Arc::new(MemoryStorage::new());
        backend.set_item(CART_KEY, raw).unwrap();
        let store = new_store(&backend);
        assert!(store.get().items.is_empty(), "raw value {raw} leaked through");
    }
}

#[test]
fn none_written_via_updater_persists_empty_cart() {
    let backend = Arc::new(MemoryStorage::new());
    let store = new_store(&backend);
    store.add_item(CartItem::new("p1", "Mug", 9.5, 2));

    store.update(|_| None);

    assert!(store.get().items.is_empty());
    assert_eq!(stored_cart(&backend), serde_json::json!({ "items": [] }));
}

#[test]
fn none_written_as_literal_persists_empty_cart() {
    let backend = Arc::new(MemoryStorage::new());
    let store = new_store(&backend);

    store.replace(None);

    assert_eq!(stored_cart(&backend), serde_json::json!({ "items": [] }));
}

#[test]
fn writes_round_trip_into_fresh_store() {
    let backend = Arc::new(MemoryStorage::new());
    let store = new_store(&backend);
    store.add_item(CartItem::new("p1", "Mug", 9.5, 1));
    store.add_item(CartItem::new("p2", "Lamp", 20.0, 1));
    store.add_item(CartItem::new("p1", "Mug", 9.5, 1));
    store.set_quantity("p2", 3);

    let reloaded = new_store(&backend);
    assert_eq!(reloaded.get(), store.get());
    assert_eq!(reloaded.item_count(), 5);
    assert_eq!(reloaded.subtotal(), 79.0);
    assert_eq!(
        stored_cart(&backend)["items"][0],
        serde_json::json!({ "productId": "p1", "title": "Mug", "price": 9.5, "quantity": 2 })
    );
}

#[test]
fn unstorable_price_never_reaches_storage() {
    let backend = Arc::new(MemoryStorage::new());
    let store = new_store(&backend);
    assert!(store.add_item(CartItem::new("p-ok", "Mug", 9.5, 1)));
    assert!(!store.add_item(CartItem::new("p-nan", "Broken", f64::NAN, 1)));
    // A caller-built cart bypasses add_item; the bad line is dropped on write.
    store.update(|cart| {
        let mut next = cart.clone();
        next.items.push(CartItem::new("p-inf", "Broken", f64::INFINITY, 1));
        Some(next)
    });

    let reloaded = new_store(&backend);
    assert_eq!(reloaded.get().items.len(), 1);
    assert_eq!(reloaded.get().quantity_of("p-ok"), 1);
    assert_eq!(reloaded.subtotal(), 9.5);
}

#[test]
fn updater_sees_latest_committed_cart() {
    let backend = Arc::new(MemoryStorage::new());
    let store = new_store(&backend);
    let stale_snapshot = store.get();

    store.add_item(CartItem::new("p1", "Mug", 9.5, 1));
    // A completion callback recomputing from current state keeps the first write.
    store.update(|current| Some(current.with_item(CartItem::new("p2", "Lamp", 20.0, 1))));

    assert!(stale_snapshot.is_empty());
    assert_eq!(store.get().items.len(), 2);
}

#[test]
fn storage_failure_keeps_in_memory_cart() {
    let store = CartStore::new(&StorageAdapter::unavailable(), &EventBus::new());
    store.add_item(CartItem::new("p1", "Mug", 9.5, 1));
    assert_eq!(store.item_count(), 1);
}

#[test]
fn every_write_publishes_cart_changed_with_item_count() {
    let bus = EventBus::new();
    let store = CartStore::new(&StorageAdapter::session(), &bus);
    let counts = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&counts);
    let _subscription = bus.subscribe(Topic::CartChanged, move |event| {
        if let UiEvent::CartChanged { item_count } = event {
            sink.lock().unwrap().push(*item_count);
        }
    });

    store.add_item(CartItem::new("p1", "Mug", 9.5, 2));
    store.remove_item("p1");
    store.clear();

    assert_eq!(*counts.lock().unwrap(), vec![2, 0, 0]);
}

#[test]
fn item_count_projection_follows_writes() {
    let store = CartStore::new(&StorageAdapter::session(), &EventBus::new());
    let badge = store.item_count_atom().clone();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _subscription = badge.subscribe(move |count| sink.lock().unwrap().push(*count));

    store.add_item(CartItem::new("p1", "Mug", 9.5, 3));
    store.set_quantity("p1", 1);

    assert_eq!(badge.get(), 1);
    assert_eq!(*seen.lock().unwrap(), vec![3, 1]);
}
