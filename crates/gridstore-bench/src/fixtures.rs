//! Test data generation for benchmarks.
//!
//! Generators are seeded, so every run measures the same data.

use gridstore_core::{Entity, FieldAccess, FieldValue, MemoryStore, TreeEntity};
use gridstore_model::Value;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Scale factor for benchmark data generation.
#[derive(Clone, Copy, Debug)]
pub enum Scale {
    /// ~100 records, for quick iteration.
    Small,
    /// ~2,000 records.
    Medium,
    /// ~20,000 records.
    Large,
}

impl Scale {
    /// Record count for this scale.
    pub fn count(&self) -> usize {
        match self {
            Scale::Small => 100,
            Scale::Medium => 2_000,
            Scale::Large => 20_000,
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::Medium
    }
}

/// Flat record used by the query and cache benchmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub age: i64,
    pub create_time: i64,
}

impl FieldAccess for Customer {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "Id" => Some(FieldValue::Scalar(Value::Int(self.id))),
            "Name" => Some(FieldValue::Scalar(Value::String(self.name.clone()))),
            "Status" => Some(FieldValue::Scalar(Value::String(self.status.clone()))),
            "Age" => Some(FieldValue::Scalar(Value::Int(self.age))),
            "CreateTime" => Some(FieldValue::Scalar(Value::Int(self.create_time))),
            _ => None,
        }
    }
}

impl Entity for Customer {
    const NAME: &'static str = "Customer";

    fn id(&self) -> Value {
        Value::Int(self.id)
    }

    fn created_field() -> Option<&'static str> {
        Some("CreateTime")
    }
}

/// Hierarchical record used by the tree benchmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgUnit {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
}

impl OrgUnit {
    pub fn new(id: i64, parent_id: Option<i64>, name: impl Into<String>) -> Self {
        Self {
            id,
            parent_id,
            name: name.into(),
        }
    }
}

impl FieldAccess for OrgUnit {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "Id" => Some(FieldValue::Scalar(Value::Int(self.id))),
            "ParentId" => Some(FieldValue::Scalar(
                self.parent_id.map(Value::Int).unwrap_or(Value::Null),
            )),
            "Name" => Some(FieldValue::Scalar(Value::String(self.name.clone()))),
            _ => None,
        }
    }
}

impl Entity for OrgUnit {
    const NAME: &'static str = "OrgUnit";

    fn id(&self) -> Value {
        Value::Int(self.id)
    }
}

impl TreeEntity for OrgUnit {
    fn parent_id(&self) -> Option<Value> {
        self.parent_id.map(Value::Int)
    }
}

/// Generate customers with a realistic field distribution.
pub fn generate_customers(count: usize) -> Vec<Customer> {
    const SEED: u64 = 12345;
    let mut rng = StdRng::seed_from_u64(SEED);

    let statuses = ["active", "inactive", "pending", "vip"];
    let name_prefixes = [
        "Alice", "Bob", "Charlie", "David", "Eve", "Frank", "Grace", "Henry", "Ivy", "Jack",
    ];

    (0..count)
        .map(|i| Customer {
            id: i as i64 + 1,
            name: format!("{}_{}", name_prefixes[i % name_prefixes.len()], i),
            status: statuses[i % statuses.len()].to_string(),
            age: 18 + (rng.gen::<u32>() % 60) as i64,
            create_time: 1_700_000_000 + i as i64,
        })
        .collect()
}

/// Generate a forest: `roots` trees, each node having `children_per_node`
/// children down to `depth` levels (a depth of 1 is roots only).
pub fn generate_org_units(roots: usize, children_per_node: usize, depth: usize) -> Vec<OrgUnit> {
    let mut units = Vec::new();
    let mut next_id = 1i64;

    for _ in 0..roots {
        let root_id = next_id;
        next_id += 1;
        units.push(OrgUnit::new(root_id, None, format!("Unit {root_id}")));

        let mut level = vec![root_id];
        for _ in 1..depth {
            let mut next_level = Vec::with_capacity(level.len() * children_per_node);
            for &parent in &level {
                for _ in 0..children_per_node {
                    let id = next_id;
                    next_id += 1;
                    units.push(OrgUnit::new(id, Some(parent), format!("Unit {id}")));
                    next_level.push(id);
                }
            }
            level = next_level;
        }
    }
    units
}

/// Customer store seeded at the given scale.
pub fn customer_store(scale: Scale) -> MemoryStore<Customer> {
    MemoryStore::with_records(generate_customers(scale.count()))
}

/// Org-unit store holding the given forest shape.
pub fn org_store(roots: usize, children_per_node: usize, depth: usize) -> MemoryStore<OrgUnit> {
    MemoryStore::with_records(generate_org_units(roots, children_per_node, depth))
}
