//! Categories and category tree assembly.
//!
//! The store keeps categories as a flat table where each row may point at a
//! parent. Storefront menus need a nested forest, so the whole table is
//! fetched and reassembled on every load.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Slug};

/// A category row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    pub parent_id: Option<CategoryId>,
}

impl Category {
    /// Create a root category with a slug derived from its name.
    #[must_use]
    pub fn root(id: CategoryId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            slug: Slug::from_name(&name),
            name,
            parent_id: None,
        }
    }

    /// Create a child category with a slug derived from its name.
    #[must_use]
    pub fn child(id: CategoryId, name: impl Into<String>, parent_id: CategoryId) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::root(id, name)
        }
    }
}

/// A category with its nested subcategories.
///
/// Serializes flat, so a node looks like the stored row plus a
/// `subcategories` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<CategoryNode>,
}

impl CategoryNode {
    #[must_use]
    pub const fn id(&self) -> CategoryId {
        self.category.id
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.subcategories.iter().map(Self::len).sum::<usize>()
    }

    /// Always false: a node contains at least itself.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Depth-first search for a node by id.
    #[must_use]
    pub fn find(&self, id: CategoryId) -> Option<&Self> {
        if self.category.id == id {
            return Some(self);
        }
        self.subcategories.iter().find_map(|child| child.find(id))
    }

    /// Ids of this subtree in pre-order.
    #[must_use]
    pub fn ids(&self) -> Vec<CategoryId> {
        let mut out = Vec::with_capacity(self.len());
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids(&self, out: &mut Vec<CategoryId>) {
        out.push(self.category.id);
        for child in &self.subcategories {
            child.collect_ids(out);
        }
    }
}

/// Result of assembling a category forest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryForest {
    /// Root nodes, in input order.
    pub roots: Vec<CategoryNode>,
    /// Categories that could not be placed: orphans whose parent was not in
    /// the input, their descendants, and members of parent cycles.
    pub dropped: Vec<Category>,
}

/// Assemble a flat list of categories into a forest.
///
/// Children keep the relative order they had in the input, so a
/// name-ordered input yields name-ordered siblings at every level.
///
/// A category whose `parent_id` is not present in the input is an orphan.
/// It is left out of the forest together with everything below it and
/// reported in [`CategoryForest::dropped`]. Rows caught in a parent cycle
/// are unreachable from any root and are dropped the same way. If an id
/// appears twice, the first row wins and the duplicate is dropped.
#[must_use]
pub fn build_category_tree(categories: Vec<Category>) -> CategoryForest {
    // Pass 1: id -> position
    let mut index: HashMap<CategoryId, usize> = HashMap::with_capacity(categories.len());
    let mut duplicates = Vec::new();
    for (position, category) in categories.iter().enumerate() {
        if index.contains_key(&category.id) {
            duplicates.push(position);
        } else {
            index.insert(category.id, position);
        }
    }

    // Pass 2: attach each row to its parent or to the root list
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); categories.len()];
    let mut roots = Vec::new();
    for (position, category) in categories.iter().enumerate() {
        if duplicates.contains(&position) {
            continue;
        }
        match category.parent_id {
            None => roots.push(position),
            Some(parent_id) => {
                if let Some(siblings) = index
                    .get(&parent_id)
                    .and_then(|&parent| children.get_mut(parent))
                {
                    siblings.push(position);
                }
            }
        }
    }

    let mut slots: Vec<Option<Category>> = categories.into_iter().map(Some).collect();
    let roots = roots
        .into_iter()
        .filter_map(|position| assemble(position, &mut slots, &mut children))
        .collect();
    let dropped = slots.into_iter().flatten().collect();

    CategoryForest { roots, dropped }
}

fn assemble(
    position: usize,
    slots: &mut [Option<Category>],
    children: &mut [Vec<usize>],
) -> Option<CategoryNode> {
    let category = slots.get_mut(position)?.take()?;
    let child_positions = std::mem::take(children.get_mut(position)?);
    let subcategories = child_positions
        .into_iter()
        .filter_map(|child| assemble(child, slots, children))
        .collect();

    Some(CategoryNode {
        category,
        subcategories,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn id(n: u128) -> CategoryId {
        CategoryId::from_u128(n)
    }

    #[test]
    fn test_furniture_chairs_orphan() {
        let forest = build_category_tree(vec![
            Category::root(id(1), "Furniture"),
            Category::child(id(2), "Chairs", id(1)),
            Category::child(id(3), "Orphan", id(99)),
        ]);

        assert_eq!(forest.roots.len(), 1);
        assert_eq!(forest.roots[0].category.name, "Furniture");
        assert_eq!(forest.roots[0].subcategories.len(), 1);
        assert_eq!(forest.roots[0].subcategories[0].category.name, "Chairs");
        assert!(forest.roots.iter().all(|root| root.find(id(3)).is_none()));
        assert_eq!(forest.dropped.len(), 1);
        assert_eq!(forest.dropped[0].id, id(3));
    }

    #[test]
    fn test_every_resolvable_record_appears_once() {
        // Name-ordered input where a child sorts before its parent
        let input = vec![
            Category::child(id(4), "Armchairs", id(2)),
            Category::root(id(5), "Bedroom"),
            Category::child(id(2), "Chairs", id(1)),
            Category::child(id(6), "Dressers", id(5)),
            Category::root(id(1), "Furniture"),
            Category::child(id(3), "Stools", id(2)),
        ];
        let forest = build_category_tree(input.clone());

        let mut seen: Vec<CategoryId> = forest.roots.iter().flat_map(CategoryNode::ids).collect();
        seen.sort();
        let mut expected: Vec<CategoryId> = input.iter().map(|c| c.id).collect();
        expected.sort();
        assert_eq!(seen, expected);
        assert!(forest.dropped.is_empty());
    }

    #[test]
    fn test_arbitrary_depth_and_sibling_order() {
        let forest = build_category_tree(vec![
            Category::child(id(4), "Armchairs", id(2)),
            Category::child(id(2), "Chairs", id(1)),
            Category::root(id(1), "Furniture"),
            Category::child(id(3), "Stools", id(2)),
        ]);

        let furniture = &forest.roots[0];
        let chairs = &furniture.subcategories[0];
        let names: Vec<&str> = chairs
            .subcategories
            .iter()
            .map(|n| n.category.name.as_str())
            .collect();
        assert_eq!(names, ["Armchairs", "Stools"]);
        assert_eq!(furniture.len(), 4);
    }

    #[test]
    fn test_orphan_descendants_are_dropped() {
        let forest = build_category_tree(vec![
            Category::child(id(3), "Orphan", id(99)),
            Category::child(id(4), "Orphan Child", id(3)),
            Category::root(id(1), "Furniture"),
        ]);

        assert_eq!(forest.roots.len(), 1);
        assert_eq!(forest.roots[0].len(), 1);
        assert_eq!(forest.dropped.len(), 2);
    }

    #[test]
    fn test_cycles_are_dropped_without_looping() {
        let forest = build_category_tree(vec![
            Category::child(id(1), "A", id(2)),
            Category::child(id(2), "B", id(1)),
            Category::child(id(3), "Self", id(3)),
        ]);

        assert!(forest.roots.is_empty());
        assert_eq!(forest.dropped.len(), 3);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let forest = build_category_tree(vec![
            Category::root(id(1), "First"),
            Category::root(id(1), "Second"),
        ]);

        assert_eq!(forest.roots.len(), 1);
        assert_eq!(forest.roots[0].category.name, "First");
        assert_eq!(forest.dropped[0].name, "Second");
    }

    #[test]
    fn test_node_serializes_flat() {
        let forest = build_category_tree(vec![
            Category::root(id(1), "Furniture"),
            Category::child(id(2), "Chairs", id(1)),
        ]);
        let json = serde_json::to_value(&forest.roots[0]).unwrap();

        assert_eq!(json["name"], "Furniture");
        assert_eq!(json["slug"], "furniture");
        assert!(json["parent_id"].is_null());
        assert_eq!(json["subcategories"][0]["name"], "Chairs");
    }
}
