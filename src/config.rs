//! Declarative container setup loaded from JSON.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::container::{AcceptRules, Container};
use crate::drag::DragConfig;
use crate::error::{InventoryError, Result};
use crate::geometry::{Point, Size};
use crate::grid::{GridMode, ItemId};
use crate::layout::{self, CellGroupEntry, LayoutRect};
use crate::registry::{ContainerId, ContainerRegistry};

/// Catalog cell size in pixels.
pub const DEFAULT_CELL_SIZE: f32 = 72.0;

fn default_cell_size() -> f32 {
    DEFAULT_CELL_SIZE
}

fn default_true() -> bool {
    true
}

/// Engine-wide settings plus the containers to register at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    #[serde(default = "default_true")]
    pub allow_rotation: bool,
    #[serde(default)]
    pub containers: Vec<ContainerSpec>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            allow_rotation: true,
            containers: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        check_cell_size("engine", self.cell_size)?;
        for spec in &self.containers {
            spec.validate()?;
        }
        Ok(())
    }

    /// Build and register every configured container, in declaration order.
    pub fn build_registry(&self) -> Result<ContainerRegistry> {
        let mut registry = ContainerRegistry::new();
        self.populate(&mut registry)?;
        Ok(registry)
    }

    /// Register the configured containers into an existing registry.
    pub fn populate(&self, registry: &mut ContainerRegistry) -> Result<()> {
        self.validate()?;
        for spec in &self.containers {
            registry.register(spec.build(self.cell_size)?)?;
            if let Some(owner) = &spec.owned_by {
                registry.set_owner(&spec.id, owner.clone())?;
            }
        }
        Ok(())
    }

    /// Drag settings derived from this config; logging and metrics stay off.
    pub fn drag_config(&self) -> DragConfig {
        DragConfig {
            allow_rotation: self.allow_rotation,
            ..DragConfig::default()
        }
    }
}

/// One container as declared in config.
///
/// Cell mode needs a region source: an explicit `layout`, `cellGroups` to
/// synthesize one from, or a plain `size`. Slot mode needs none of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub id: ContainerId,
    #[serde(default)]
    pub origin: Point,
    #[serde(default)]
    pub cell_size: Option<f32>,
    #[serde(default)]
    pub size: Option<Size>,
    #[serde(default)]
    pub cell_groups: Vec<CellGroupEntry>,
    #[serde(default)]
    pub layout: Vec<LayoutRect>,
    #[serde(default)]
    pub mode: GridMode,
    #[serde(default)]
    pub accept: Vec<String>,
    #[serde(default)]
    pub reject: Vec<String>,
    #[serde(default)]
    pub accept_ids: Vec<ItemId>,
    /// Item this container belongs to; it can never be dropped inside.
    #[serde(default)]
    pub owned_by: Option<ItemId>,
}

impl ContainerSpec {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(config_error("container id must not be empty"));
        }
        if let Some(cell_size) = self.cell_size {
            check_cell_size(&self.id, cell_size)?;
        }
        if self.mode == GridMode::Slot {
            return Ok(());
        }
        if !self.layout.is_empty() && !self.cell_groups.is_empty() {
            return Err(config_error(format!(
                "container `{}` declares both `layout` and `cellGroups`",
                self.id
            )));
        }
        if let Some(size) = self.size {
            if size.is_empty() {
                return Err(config_error(format!(
                    "container `{}` has a zero-sized `size`",
                    self.id
                )));
            }
        }
        if let Some(group) = self.cell_groups.iter().find(|group| group.size.is_empty()) {
            return Err(config_error(format!(
                "container `{}` has a zero-sized cell group in column {}",
                self.id, group.column
            )));
        }
        if self.layout.iter().any(|rect| rect.width == 0 || rect.height == 0) {
            return Err(config_error(format!(
                "container `{}` has a zero-sized layout rectangle",
                self.id
            )));
        }
        if let Some((a, b)) = layout::first_overlap(&self.layout) {
            return Err(config_error(format!(
                "container `{}` has overlapping layout rectangles {a} and {b}",
                self.id
            )));
        }
        if self.size.is_none() && self.layout.is_empty() && self.cell_groups.is_empty() {
            return Err(config_error(format!(
                "container `{}` needs `size`, `layout` or `cellGroups`",
                self.id
            )));
        }
        Ok(())
    }

    /// Subgrid rectangles this spec resolves to. Empty means "one region of
    /// `size`".
    pub fn resolved_layout(&self) -> Vec<LayoutRect> {
        if !self.layout.is_empty() {
            self.layout.clone()
        } else {
            layout::synthesize(&self.cell_groups)
        }
    }

    pub fn build(&self, default_cell_size: f32) -> Result<Container> {
        self.validate()?;
        let cell_size = self.cell_size.unwrap_or(default_cell_size);
        let rules = AcceptRules {
            accept: self.accept.clone(),
            reject: self.reject.clone(),
            accept_ids: self.accept_ids.clone(),
        };
        let container = match self.mode {
            GridMode::Slot => Container::slot(self.id.clone(), cell_size),
            GridMode::Cells => {
                let rects = self.resolved_layout();
                let fallback = self.size.unwrap_or_else(|| layout::bounds(&rects));
                Container::from_layout(self.id.clone(), &rects, fallback, cell_size)
            }
        };
        Ok(container.with_origin(self.origin).with_rules(rules))
    }
}

fn check_cell_size(owner: &str, cell_size: f32) -> Result<()> {
    if cell_size.is_finite() && cell_size > 0.0 {
        Ok(())
    } else {
        Err(config_error(format!(
            "{owner}: cell size must be positive, got {cell_size}"
        )))
    }
}

fn config_error(message: impl Into<String>) -> InventoryError {
    InventoryError::Config(message.into())
}
