use carepush_domain::{Entity, ID};
use std::sync::Mutex;

/// Useful functions for creating inmemory repositories

pub fn insert<T: Clone>(val: &T, collection: &Mutex<Vec<T>>) {
    let mut collection = collection.lock().unwrap();
    collection.push(val.clone());
}

pub fn save<T: Clone + Entity<ID>>(val: &T, collection: &Mutex<Vec<T>>) {
    let mut collection = collection.lock().unwrap();
    for i in 0..collection.len() {
        if collection[i].id() == val.id() {
            collection.splice(i..i + 1, vec![val.clone()]);
        }
    }
}

pub fn find<T: Clone + Entity<ID>>(val_id: &ID, collection: &Mutex<Vec<T>>) -> Option<T> {
    let collection = collection.lock().unwrap();
    collection.iter().find(|v| v.id() == *val_id).cloned()
}

pub fn find_by<T: Clone, F: FnMut(&T) -> bool>(
    collection: &Mutex<Vec<T>>,
    mut compare: F,
) -> Vec<T> {
    let collection = collection.lock().unwrap();
    let mut items = Vec::new();
    for item in collection.iter() {
        if compare(item) {
            items.push(item.clone());
        }
    }
    items
}

pub fn delete<T: Clone + Entity<ID>>(val_id: &ID, collection: &Mutex<Vec<T>>) -> Option<T> {
    let mut collection = collection.lock().unwrap();
    for i in 0..collection.len() {
        if collection[i].id() == *val_id {
            let deleted_val = collection.remove(i);
            return Some(deleted_val);
        }
    }
    None
}
