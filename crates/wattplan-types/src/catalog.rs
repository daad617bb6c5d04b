// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of WattPlan.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use crate::equipment::{EquipmentItem, EquipmentKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// In-memory snapshot of the upstream equipment catalog
///
/// The snapshot is read-only once built; accessors return borrowed
/// views and the item list is never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    items: Vec<EquipmentItem>,
    pub fetched_at: DateTime<Utc>,
}

impl Catalog {
    pub fn new(items: Vec<EquipmentItem>, fetched_at: DateTime<Utc>) -> Self {
        Self { items, fetched_at }
    }

    pub fn items(&self) -> &[EquipmentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by its catalog id
    pub fn item(&self, id: u64) -> Option<&EquipmentItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn of_kind(&self, kind: EquipmentKind) -> impl Iterator<Item = &EquipmentItem> {
        self.items.iter().filter(move |item| item.kind() == kind)
    }

    pub fn panels(&self) -> impl Iterator<Item = &EquipmentItem> {
        self.of_kind(EquipmentKind::SolarPanel)
    }

    pub fn inverters(&self) -> impl Iterator<Item = &EquipmentItem> {
        self.of_kind(EquipmentKind::Inverter)
    }

    pub fn batteries(&self) -> impl Iterator<Item = &EquipmentItem> {
        self.of_kind(EquipmentKind::Battery)
    }
}
