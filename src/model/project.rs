use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::column::{self, Column};
use super::feature::Feature;

/// Project-level fields that are edited together (everything except the
/// board contents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    /// User ids drawn from the roster
    #[serde(default)]
    pub collaborators: Vec<String>,
    #[serde(default)]
    pub owner: String,
}

/// A board: columns plus the features placed in them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(flatten)]
    pub meta: ProjectMeta,
    #[serde(default = "column::default_columns")]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl Project {
    /// A new project seeded with the default columns
    pub fn new(id: impl Into<String>, name: impl Into<String>, owner: impl Into<String>) -> Self {
        let owner = owner.into();
        Project {
            id: id.into(),
            meta: ProjectMeta {
                name: name.into(),
                collaborators: if owner.is_empty() {
                    Vec::new()
                } else {
                    vec![owner.clone()]
                },
                owner,
                ..Default::default()
            },
            columns: column::default_columns(),
            features: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn has_column(&self, column_id: &str) -> bool {
        self.column(column_id).is_some()
    }

    /// Columns in display order
    pub fn ordered_columns(&self) -> Vec<&Column> {
        column::ordered(&self.columns)
    }

    pub fn feature(&self, feature_id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == feature_id)
    }

    pub fn feature_mut(&mut self, feature_id: &str) -> Option<&mut Feature> {
        self.features.iter_mut().find(|f| f.id == feature_id)
    }

    /// Features sitting in the given column, in list order
    pub fn features_in(&self, column_id: &str) -> Vec<&Feature> {
        self.features.iter().filter(|f| f.status == column_id).collect()
    }

    /// Features whose status does not name an existing column.
    /// Always empty when the board invariants hold.
    pub fn orphaned_features(&self) -> Vec<&Feature> {
        self.features
            .iter()
            .filter(|f| !self.has_column(&f.status))
            .collect()
    }

    /// Put the project back into a valid shape after loading untrusted data:
    /// guarantees at least one column and re-homes features pointing at
    /// missing columns to the first column by order.
    pub fn repair(&mut self) -> usize {
        if self.columns.is_empty() {
            self.columns = column::default_columns();
        }
        let Some(first) = column::first_by_order(&self.columns).map(|c| c.id.clone()) else {
            return 0;
        };
        let column_ids: Vec<String> = self.columns.iter().map(|c| c.id.clone()).collect();
        let mut fixed = 0;
        for feature in &mut self.features {
            if !column_ids.contains(&feature.status) {
                feature.status = first.clone();
                fixed += 1;
            }
        }
        fixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn project_json_is_flat() {
        let p = Project::new("p1", "Website", "u1");
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["name"], "Website");
        assert_eq!(v["owner"], "u1");
        assert_eq!(v["columns"].as_array().unwrap().len(), 4);
        assert!(v.get("meta").is_none());
    }

    #[test]
    fn missing_columns_fall_back_to_defaults() {
        let p: Project = serde_json::from_str(r#"{"id":"p1","name":"Old"}"#).unwrap();
        assert_eq!(p.columns.len(), 4);
        assert!(p.features.is_empty());
    }

    #[test]
    fn repair_rehomes_orphans() {
        let mut p = Project::new("p1", "Website", "u1");
        p.features.push(Feature::new("f1", "A", "gone"));
        p.features.push(Feature::new("f2", "B", "working"));
        assert_eq!(p.orphaned_features().len(), 1);
        assert_eq!(p.repair(), 1);
        assert_eq!(p.feature("f1").unwrap().status, "ideas");
        assert_eq!(p.feature("f2").unwrap().status, "working");
        assert!(p.orphaned_features().is_empty());
    }

    #[test]
    fn repair_restores_empty_column_list() {
        let mut p = Project::new("p1", "Website", "u1");
        p.columns.clear();
        p.features.push(Feature::new("f1", "A", "whatever"));
        p.repair();
        assert!(!p.columns.is_empty());
        assert_eq!(p.feature("f1").unwrap().status, "ideas");
    }
}
