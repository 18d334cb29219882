//! Response shapes with nested relations, and the queries that fill them
//!
//! Relations are loaded level by level with one `IN (...)` query per level
//! instead of one query per parent row.

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use uuid::Uuid;

use crate::entity::{category, content, dashboard, element, template};

/// Which relations to attach to a dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardRelations {
    /// Category only
    Category,
    /// Category and templates
    Template,
    /// Category, templates, their elements and the elements' contents
    Full,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    #[serde(flatten)]
    pub dashboard: dashboard::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<category::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates: Option<Vec<TemplateView>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateView {
    #[serde(flatten)]
    pub template: template::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<ElementView>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementView {
    #[serde(flatten)]
    pub element: element::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<content::Model>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    #[serde(flatten)]
    pub category: category::Model,
    pub dashboards: Vec<dashboard::Model>,
}

fn group_by<K, V>(items: Vec<V>, key: impl Fn(&V) -> K) -> HashMap<K, Vec<V>>
where
    K: Eq + Hash,
{
    let mut map: HashMap<K, Vec<V>> = HashMap::new();
    for item in items {
        map.entry(key(&item)).or_default().push(item);
    }
    map
}

/// Contents of the given elements, newest date first
async fn load_contents<C: ConnectionTrait>(
    db: &C,
    element_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, Vec<content::Model>>, DbErr> {
    if element_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let contents = content::Entity::find()
        .filter(content::Column::ElementId.is_in(element_ids))
        .order_by_desc(content::Column::Date)
        .all(db)
        .await?;
    Ok(group_by(contents, |c| c.element_id))
}

/// Elements of the given templates, optionally with their contents
pub async fn load_elements<C: ConnectionTrait>(
    db: &C,
    template_ids: Vec<Uuid>,
    with_contents: bool,
) -> Result<HashMap<Uuid, Vec<ElementView>>, DbErr> {
    if template_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let elements = element::Entity::find()
        .filter(element::Column::TemplateId.is_in(template_ids))
        .order_by_asc(element::Column::Name)
        .all(db)
        .await?;

    let mut contents = if with_contents {
        load_contents(db, elements.iter().map(|e| e.id).collect()).await?
    } else {
        HashMap::new()
    };

    let views = elements
        .into_iter()
        .map(|e| ElementView {
            contents: with_contents.then(|| contents.remove(&e.id).unwrap_or_default()),
            element: e,
        })
        .collect();
    Ok(group_by(views, |v: &ElementView| v.element.template_id))
}

/// Templates of the given dashboards ordered by `index`
async fn load_templates<C: ConnectionTrait>(
    db: &C,
    dashboard_ids: Vec<Uuid>,
    with_elements: bool,
) -> Result<HashMap<Uuid, Vec<TemplateView>>, DbErr> {
    if dashboard_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let templates = template::Entity::find()
        .filter(template::Column::DashboardId.is_in(dashboard_ids))
        .order_by_asc(template::Column::Index)
        .all(db)
        .await?;

    let mut elements = if with_elements {
        load_elements(db, templates.iter().map(|t| t.id).collect(), true).await?
    } else {
        HashMap::new()
    };

    let views = templates
        .into_iter()
        .map(|t| TemplateView {
            elements: with_elements.then(|| elements.remove(&t.id).unwrap_or_default()),
            template: t,
        })
        .collect();
    Ok(group_by(views, |v: &TemplateView| v.template.dashboard_id))
}

/// Attach the requested relations to a batch of dashboards, keeping their order
pub async fn attach_relations<C: ConnectionTrait>(
    db: &C,
    dashboards: Vec<dashboard::Model>,
    relations: DashboardRelations,
) -> Result<Vec<DashboardView>, DbErr> {
    if dashboards.is_empty() {
        return Ok(Vec::new());
    }

    let mut names: Vec<String> = dashboards.iter().map(|d| d.category_name.clone()).collect();
    names.sort();
    names.dedup();
    let categories: HashMap<String, category::Model> = category::Entity::find()
        .filter(category::Column::Name.is_in(names))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.name.clone(), c))
        .collect();

    let with_templates = relations != DashboardRelations::Category;
    let mut templates = if with_templates {
        load_templates(
            db,
            dashboards.iter().map(|d| d.id).collect(),
            relations == DashboardRelations::Full,
        )
        .await?
    } else {
        HashMap::new()
    };

    Ok(dashboards
        .into_iter()
        .map(|d| DashboardView {
            category: categories.get(&d.category_name).cloned(),
            templates: with_templates.then(|| templates.remove(&d.id).unwrap_or_default()),
            dashboard: d,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_by_keeps_order_within_groups() {
        let grouped = group_by(vec![(1, "a"), (2, "b"), (1, "c")], |(k, _)| *k);
        assert_eq!(grouped[&1], vec![(1, "a"), (1, "c")]);
        assert_eq!(grouped[&2], vec![(2, "b")]);
    }
}
