//! Registro de boards.
//!
//! Handles são 1-based (0 nunca é um handle válido) e estáveis enquanto o
//! driver existir: boards só saem do registro no fechamento do driver.

use super::Board;
use crate::core::config::MAX_BOARDS;
use crate::ioctl::error::{CgosError, CgosResult};
use alloc::vec::Vec;

pub struct BoardRegistry {
    boards: Vec<Board>,
    limit: usize,
}

impl BoardRegistry {
    /// Registro com capacidade `limit` (nunca acima de `MAX_BOARDS`).
    pub fn new(limit: usize) -> Self {
        let limit = limit.clamp(1, MAX_BOARDS);
        Self {
            boards: Vec::with_capacity(limit),
            limit,
        }
    }

    /// Adiciona a board e devolve seu handle.
    pub fn register(&mut self, board: Board) -> CgosResult<u32> {
        if self.boards.len() >= self.limit {
            crate::kwarn!("(Registry) Limite de boards atingido=", dec self.limit);
            return Err(CgosError::Error);
        }
        self.boards.push(board);
        Ok(self.boards.len() as u32)
    }

    pub fn get(&self, handle: u32) -> Option<&Board> {
        let index = (handle as usize).checked_sub(1)?;
        self.boards.get(index)
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.limit
    }

    /// Handle da primeira board com este nome.
    pub fn find_by_name(&self, name: &str) -> Option<u32> {
        self.boards
            .iter()
            .position(|b| b.name() == name)
            .map(|i| i as u32 + 1)
    }

    fn matches(board: &Board, class: u32) -> bool {
        class == 0 || board.primary_class() == class
    }

    /// Boards da classe (0 = todas).
    pub fn count(&self, class: u32) -> usize {
        self.boards.iter().filter(|b| Self::matches(b, class)).count()
    }

    /// Handle da `index`-ésima board da classe.
    pub fn nth(&self, class: u32, index: usize) -> Option<u32> {
        self.boards
            .iter()
            .enumerate()
            .filter(|(_, b)| Self::matches(b, class))
            .nth(index)
            .map(|(i, _)| i as u32 + 1)
    }

    /// Boards e seus handles
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Board)> {
        self.boards.iter().enumerate().map(|(i, b)| (i as u32 + 1, b))
    }
}
