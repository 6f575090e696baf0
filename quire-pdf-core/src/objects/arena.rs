//! Indirect object arena.
//!
//! Object numbers are handed out densely starting at 1. A number can be
//! reserved before its object exists (the page tree root is referenced by
//! every page before it is built), and each record receives its byte span
//! when the writer emits it.

use crate::error::{PdfError, Result};
use crate::objects::{Object, ObjectId};
use std::ops::Range;

#[derive(Debug, Clone)]
struct IndirectObject {
    id: ObjectId,
    object: Option<Object>,
    span: Option<Range<u64>>,
}

#[derive(Debug, Default)]
pub struct ObjectArena {
    records: Vec<IndirectObject>,
}

impl ObjectArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next object number without an object attached.
    pub fn reserve(&mut self) -> ObjectId {
        let id = ObjectId::new(self.records.len() as u32 + 1, 0);
        self.records.push(IndirectObject {
            id,
            object: None,
            span: None,
        });
        id
    }

    pub fn fill(&mut self, id: ObjectId, object: Object) -> Result<()> {
        let record = self.record_mut(id)?;
        if record.object.is_some() {
            return Err(PdfError::InvalidStructure(format!(
                "Object {} was filled twice",
                id.number()
            )));
        }
        record.object = Some(object);
        Ok(())
    }

    pub fn push(&mut self, object: Object) -> ObjectId {
        let id = self.reserve();
        if let Some(record) = self.records.last_mut() {
            record.object = Some(object);
        }
        id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Takes the object out of its record, leaving the slot ready to receive a span.
    pub fn take(&mut self, id: ObjectId) -> Result<Object> {
        self.record_mut(id)?.object.take().ok_or_else(|| {
            PdfError::InvalidStructure(format!(
                "Object {} was reserved but never written",
                id.number()
            ))
        })
    }

    pub fn set_span(&mut self, id: ObjectId, span: Range<u64>) -> Result<()> {
        self.record_mut(id)?.span = Some(span);
        Ok(())
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.records.iter().map(|r| r.id).collect()
    }

    /// Start offsets of every object, in object-number order.
    pub fn offsets(&self) -> Result<Vec<u64>> {
        self.records
            .iter()
            .map(|r| {
                r.span.as_ref().map(|s| s.start).ok_or_else(|| {
                    PdfError::InvalidStructure(format!(
                        "Object {} has no recorded offset",
                        r.id.number()
                    ))
                })
            })
            .collect()
    }

    fn index(&self, id: ObjectId) -> Option<usize> {
        (id.number() as usize).checked_sub(1)
    }

    fn record_mut(&mut self, id: ObjectId) -> Result<&mut IndirectObject> {
        self.index(id)
            .and_then(|i| self.records.get_mut(i))
            .ok_or_else(|| PdfError::InvalidStructure(format!("Unknown object {}", id.number())))
    }
}
