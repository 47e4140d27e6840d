//! Integration tests for the query engine over the in-memory store.

use gridstore_core::{
    Entity, FieldAccess, FieldValue, MemoryStore, Repository, TreeEntity, TreeRepository,
};
use gridstore_model::{
    Combine, FilterNode, PredicateKind, QueryOptions, SaveMode, SortDirection, Value,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Department {
    name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Role {
    code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Employee {
    id: i64,
    name: String,
    age: i64,
    create_time: i64,
    department: Option<Department>,
    roles: Vec<Role>,
}

impl FieldAccess for Department {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "Name" => Some(FieldValue::Scalar(self.name.as_str().into())),
            _ => None,
        }
    }
}

impl FieldAccess for Role {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "Code" => Some(FieldValue::Scalar(self.code.as_str().into())),
            _ => None,
        }
    }
}

impl FieldAccess for Employee {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "Id" => Some(FieldValue::Scalar(Value::Int(self.id))),
            "Name" => Some(FieldValue::Scalar(self.name.as_str().into())),
            "Age" => Some(FieldValue::Scalar(Value::Int(self.age))),
            "CreateTime" => Some(FieldValue::Scalar(Value::Int(self.create_time))),
            "Department" => Some(FieldValue::Nav(
                self.department.as_ref().map(|d| d as &dyn FieldAccess),
            )),
            "Roles" => Some(FieldValue::Many(
                self.roles.iter().map(|r| r as &dyn FieldAccess).collect(),
            )),
            _ => None,
        }
    }
}

impl Entity for Employee {
    const NAME: &'static str = "Employee";

    fn id(&self) -> Value {
        Value::Int(self.id)
    }

    fn created_field() -> Option<&'static str> {
        Some("CreateTime")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Device {
    id: i64,
    parent: Option<i64>,
    name: String,
}

impl FieldAccess for Device {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "Id" => Some(FieldValue::Scalar(Value::Int(self.id))),
            "ParentId" => Some(FieldValue::Scalar(self.parent.into())),
            "Name" => Some(FieldValue::Scalar(self.name.as_str().into())),
            _ => None,
        }
    }
}

impl Entity for Device {
    const NAME: &'static str = "Device";

    fn id(&self) -> Value {
        Value::Int(self.id)
    }
}

impl TreeEntity for Device {
    fn parent_id(&self) -> Option<Value> {
        self.parent.map(Value::Int)
    }
}

fn employee(id: i64, name: &str, age: i64, dept: Option<&str>, roles: &[&str]) -> Employee {
    Employee {
        id,
        name: name.to_string(),
        age,
        create_time: id * 100,
        department: dept.map(|name| Department {
            name: name.to_string(),
        }),
        roles: roles
            .iter()
            .map(|code| Role {
                code: code.to_string(),
            })
            .collect(),
    }
}

fn seed_employees() -> MemoryStore<Employee> {
    MemoryStore::with_records(vec![
        employee(1, "ZhangSan", 28, Some("Engineering"), &["admin"]),
        employee(2, "LiSi", 35, Some("Sales"), &[]),
        employee(3, "WangWu", 41, None, &["editor", "viewer"]),
        employee(4, "ZhaoLiu", 23, Some("Engineering"), &["viewer"]),
        employee(5, "ZhangWei", 30, None, &[]),
    ])
}

fn device(id: i64, parent: Option<i64>, name: &str) -> Device {
    Device {
        id,
        parent,
        name: name.to_string(),
    }
}

// ============== Flat queries ==============

#[tokio::test]
async fn test_unfiltered_page_counts_everything() {
    let store = seed_employees();
    let page = store.query(&QueryOptions::new(1, 20), None).await;

    // Five records fit comfortably on a twenty-row page.
    assert_eq!(page.total_count, 5);
    assert_eq!(page.items.len(), 5);
    assert!(!page.is_filtered);
    assert!(!page.is_sorted);
}

#[tokio::test]
async fn test_substring_filter() {
    let store = seed_employees();
    let filter = FilterNode::contains("Name", "Zhang");
    let page = store.query(&QueryOptions::first_page(), Some(&filter)).await;

    assert_eq!(page.total_count, 2);
    assert!(page.is_filtered);
    let names: Vec<&str> = page.items.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["ZhangWei", "ZhangSan"]);
}

#[tokio::test]
async fn test_combined_filter_tree() {
    let store = seed_employees();
    // Engineering members under 25, or anyone named LiSi.
    let filter = FilterNode::navigation("Department.Name", PredicateKind::Equal, "Engineering")
        .with_child(FilterNode::value("Age", PredicateKind::LessThan, 25))
        .with_combine(Combine::And);
    let engineering_young = store
        .query(&QueryOptions::first_page(), Some(&filter))
        .await;
    assert_eq!(engineering_young.total_count, 1);
    assert_eq!(engineering_young.items[0].name, "ZhaoLiu");

    let filter = FilterNode::equal("Name", "LiSi")
        .with_combine(Combine::Or)
        .with_child(FilterNode::equal("Name", "WangWu"));
    let either = store
        .query(&QueryOptions::first_page(), Some(&filter))
        .await;
    assert_eq!(either.total_count, 2);
}

#[tokio::test]
async fn test_collection_filter_existential() {
    let store = seed_employees();
    let filter = FilterNode::collection("Roles.Code", PredicateKind::Equal, "viewer");
    let page = store.query(&QueryOptions::first_page(), Some(&filter)).await;

    assert_eq!(page.total_count, 2);
    let names: Vec<&str> = page.items.iter().map(|e| e.name.as_str()).collect();
    assert!(names.contains(&"WangWu"));
    assert!(names.contains(&"ZhaoLiu"));
}

#[tokio::test]
async fn test_paging_with_explicit_sort() {
    let store = seed_employees();
    let options = QueryOptions::new(2, 2).with_sort("Age", SortDirection::Asc);
    let page = store.query(&options, None).await;

    assert_eq!(page.total_count, 5);
    assert!(page.is_sorted);
    let ages: Vec<i64> = page.items.iter().map(|e| e.age).collect();
    assert_eq!(ages, vec![30, 35]);
}

#[tokio::test]
async fn test_query_identical_requests_agree() {
    let store = seed_employees();
    let filter = FilterNode::value("Age", PredicateKind::GreaterOrEqual, 30);
    let options = QueryOptions::new(1, 2).with_sort("Name", SortDirection::Asc);

    let first = store.query(&options, Some(&filter)).await;
    let second = store.query(&options, Some(&filter)).await;
    assert_eq!(first.total_count, second.total_count);
    assert_eq!(first.items, second.items);
}

// ============== Mutations ==============

#[tokio::test]
async fn test_save_and_delete_roundtrip() {
    let store = seed_employees();

    store
        .save(
            vec![employee(6, "SunQi", 26, None, &[])],
            SaveMode::Add,
        )
        .await
        .unwrap();
    assert_eq!(store.len(), 6);

    let removed = store
        .delete(&[Value::Int(6), Value::Int(1)])
        .await
        .unwrap();
    assert_eq!(removed, 2);

    let page = store.query(&QueryOptions::first_page(), None).await;
    assert_eq!(page.total_count, 4);
}

// ============== Tree queries ==============

#[tokio::test]
async fn test_tree_counts_roots_and_returns_subtrees() {
    // 1 <- 2 <- 3 plus an unrelated root 4.
    let store = MemoryStore::with_records(vec![
        device(1, None, "plant"),
        device(2, Some(1), "line"),
        device(3, Some(2), "sensor"),
        device(4, None, "office"),
    ]);

    let page = store.query_tree(&QueryOptions::first_page(), None).await;
    assert_eq!(page.total_count, 2);
    let ids: Vec<i64> = page.items.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_tree_single_root_chain() {
    let store = MemoryStore::with_records(vec![
        device(1, None, "root"),
        device(2, Some(1), "mid"),
        device(3, Some(2), "leaf"),
    ]);

    let page = store.query_tree(&QueryOptions::first_page(), None).await;
    // One root; every record on the chain is materialized exactly once.
    assert_eq!(page.total_count, 1);
    let ids: Vec<i64> = page.items.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_tree_filter_prunes_roots() {
    let store = MemoryStore::with_records(vec![
        device(1, None, "plant"),
        device(2, Some(1), "line"),
        device(3, None, "office"),
    ]);

    let filter = FilterNode::contains("Name", "plant");
    let page = store
        .query_tree(&QueryOptions::first_page(), Some(&filter))
        .await;
    assert_eq!(page.total_count, 1);
    let ids: Vec<i64> = page.items.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 2]);
}
