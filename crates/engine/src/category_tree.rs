//! Validation and mutation of the category tree.
//!
//! Every operation takes `&self` and returns a new [`CategoryStructure`]: a
//! failed validation leaves the original untouched, there is no partially
//! applied state. The sibling scope of an entry is either the top-level list
//! of a forest (`parent == None`) or the subcategory list of the named parent.

use crate::{
    Category, CategoryError, CategoryKind, CategoryStructure, ColorToken,
    categories::{MAX_CATEGORIES, name_key, normalize_name},
};

/// Requested fields for [`CategoryStructure::edit`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryEdit {
    pub name: String,
    pub color: ColorToken,
    /// Parent the entry should live under after the edit; `None` is top-level.
    pub parent: Option<String>,
}

fn parent_index(list: &[Category], parent: &str) -> Result<usize, CategoryError> {
    list.iter()
        .position(|category| category.name == parent)
        .ok_or_else(|| CategoryError::ParentNotFound(parent.to_string()))
}

fn normalize_parent(parent: Option<&str>) -> Option<&str> {
    parent.map(str::trim).filter(|p| !p.is_empty())
}

impl CategoryStructure {
    /// Checks that `name` may be stored in the scope selected by `parent`.
    ///
    /// `exclude_index` is the position of the entry being edited inside that
    /// scope; it is skipped by the duplicate check and disables the cap check.
    /// Returns the trimmed name on success.
    pub fn validate(
        &self,
        kind: CategoryKind,
        name: &str,
        parent: Option<&str>,
        exclude_index: Option<usize>,
    ) -> Result<String, CategoryError> {
        let name = normalize_name(name)?;

        let list = self.list(kind);
        let siblings = match normalize_parent(parent) {
            None => list,
            Some(parent) => list[parent_index(list, parent)?].subcategories.as_slice(),
        };

        if exclude_index.is_none() && siblings.len() >= MAX_CATEGORIES {
            return Err(CategoryError::CapExceeded {
                max: MAX_CATEGORIES,
            });
        }

        let key = name_key(&name);
        let duplicate = siblings
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != exclude_index)
            .any(|(_, sibling)| name_key(&sibling.name) == key);
        if duplicate {
            return Err(CategoryError::DuplicateName(name));
        }

        Ok(name)
    }

    /// Appends a category.
    ///
    /// Under a parent the new entry takes the parent's color and `color` is
    /// ignored.
    pub fn add(
        &self,
        kind: CategoryKind,
        parent: Option<&str>,
        name: &str,
        color: ColorToken,
    ) -> Result<Self, CategoryError> {
        let parent = normalize_parent(parent);
        let name = self.validate(kind, name, parent, None)?;

        let mut next = self.clone();
        let list = next.list_mut(kind);
        match parent {
            None => list.push(Category::new(name, color)),
            Some(parent) => {
                let p = parent_index(list, parent)?;
                let parent = &mut list[p];
                let color = parent.color.clone();
                parent.subcategories.push(Category::new(name, color));
            }
        }
        Ok(next)
    }

    /// Edits the entry at `index` in the scope of `parent`.
    ///
    /// When `edit.parent` names a different scope the entry moves there:
    /// - into a parent: takes the parent's color; refused if the entry still
    ///   has subcategories
    /// - out to top-level: keeps its stored color
    pub fn edit(
        &self,
        kind: CategoryKind,
        index: usize,
        parent: Option<&str>,
        edit: CategoryEdit,
    ) -> Result<Self, CategoryError> {
        let parent = normalize_parent(parent);
        let target = normalize_parent(edit.parent.as_deref());

        let list = self.list(kind);
        let current_parent = parent.map(|p| parent_index(list, p)).transpose()?;
        let current = match current_parent {
            None => list.get(index),
            Some(p) => list[p].subcategories.get(index),
        }
        .ok_or(CategoryError::IndexOutOfRange(index))?;

        if parent == target {
            let name = self.validate(kind, &edit.name, parent, Some(index))?;
            let mut next = self.clone();
            let list = next.list_mut(kind);
            match current_parent {
                None => {
                    let entry = &mut list[index];
                    entry.name = name;
                    for sub in &mut entry.subcategories {
                        sub.color = edit.color.clone();
                    }
                    entry.color = edit.color;
                }
                Some(p) => {
                    let color = list[p].color.clone();
                    let entry = &mut list[p].subcategories[index];
                    entry.name = name;
                    entry.color = color;
                }
            }
            return Ok(next);
        }

        if let Some(target) = target {
            if !current.subcategories.is_empty() {
                return Err(CategoryError::HasChildrenCannotReparent(
                    current.name.clone(),
                ));
            }
            if current_parent.is_none() && current.name == target {
                return Err(CategoryError::ParentNotFound(target.to_string()));
            }
        }

        let name = self.validate(kind, &edit.name, target, None)?;

        let mut next = self.clone();
        let list = next.list_mut(kind);
        let mut moved = match current_parent {
            None => list.remove(index),
            Some(p) => list[p].subcategories.remove(index),
        };
        moved.name = name;

        match target {
            None => list.push(moved),
            Some(target) => {
                let p = parent_index(list, target)?;
                let new_parent = &mut list[p];
                moved.color = new_parent.color.clone();
                moved.subcategories.clear();
                new_parent.subcategories.push(moved);
            }
        }
        Ok(next)
    }

    /// Removes the entry at `index` in the scope of `parent`.
    ///
    /// Removing a top-level category drops its subcategories with it. Accounts
    /// that still reference a removed name are left as they are.
    pub fn delete(
        &self,
        kind: CategoryKind,
        index: usize,
        parent: Option<&str>,
    ) -> Result<(Self, Category), CategoryError> {
        let parent = normalize_parent(parent);

        let mut next = self.clone();
        let list = next.list_mut(kind);
        let scope = match parent {
            None => list,
            Some(parent) => {
                let p = parent_index(list, parent)?;
                &mut list[p].subcategories
            }
        };
        if index >= scope.len() {
            return Err(CategoryError::IndexOutOfRange(index));
        }
        let removed = scope.remove(index);
        Ok((next, removed))
    }
}
