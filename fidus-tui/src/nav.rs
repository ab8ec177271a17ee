//! Navigation and view switching utilities.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    Overview,
    ClientDirectory,
    ClientForm,
    AssetBoard,
    AllocationLedger,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::ClientDirectory => "Clients",
            View::ClientForm => "Client Form",
            View::AssetBoard => "Assets",
            View::AllocationLedger => "Allocations",
        }
    }

    pub fn all() -> &'static [View] {
        &[
            View::Overview,
            View::ClientDirectory,
            View::ClientForm,
            View::AssetBoard,
            View::AllocationLedger,
        ]
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<View> {
        Self::all().get(index).copied()
    }

    pub fn next(&self) -> View {
        let idx = self.index();
        let all = Self::all();
        all[(idx + 1) % all.len()]
    }

    pub fn previous(&self) -> View {
        let idx = self.index();
        let all = Self::all();
        let prev = if idx == 0 { all.len() - 1 } else { idx - 1 };
        all[prev]
    }
}
