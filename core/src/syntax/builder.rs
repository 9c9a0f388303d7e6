//! Single-pass expression tree building by rotation.
//!
//! Nodes arrive left to right. Each arrival is inserted into the current
//! tree: it either fills an empty operand, sinks into the right spine when it
//! binds tighter than the node it meets, or rotates that node underneath
//! itself. Equal precedence rotates, which makes binary operators
//! left-associative. No token is looked at twice and no operator stack is
//! kept.

use super::expr::{ExprArena, ExprId, ExprKind};

impl ExprArena {
    /// Inserts `node` into the tree rooted at `root` and returns the new root.
    pub fn insert(&mut self, root: Option<ExprId>, node: ExprId) -> ExprId {
        match root {
            None => node,
            Some(root) => self.insert_node(root, node),
        }
    }

    /// Inserts `node` below or above `target`, returning whatever now
    /// occupies `target`'s slot.
    fn insert_node(&mut self, target: ExprId, node: ExprId) -> ExprId {
        if !self[target].is_operator() {
            // Leaves and guarded groups are opaque: the arriving operator
            // takes them as its operand.
            return if self.absorb(node, target) {
                node
            } else {
                tracing::warn!(?target, ?node, "value inserted next to a value");
                target
            };
        }

        let tighter = self[node].precedence > self[target].precedence;
        match self[target].kind {
            ExprKind::Unary { operand: None, .. } => {
                self.set_operand(target, node);
                target
            }
            ExprKind::Unary {
                operand: Some(operand),
                ..
            } if tighter => {
                let slot = self.insert_node(operand, node);
                self.set_operand(target, slot);
                target
            }
            ExprKind::Binary { lhs: None, .. } | ExprKind::Binary { rhs: None, .. } => {
                self.set_operand(target, node);
                target
            }
            ExprKind::Binary { rhs: Some(rhs), .. } if tighter => {
                let slot = self.insert_node(rhs, node);
                if let ExprKind::Binary { rhs, .. } = &mut self[target].kind {
                    *rhs = Some(slot);
                }
                target
            }
            _ => {
                if self.absorb(node, target) {
                    node
                } else {
                    tracing::warn!(?target, ?node, "operator has no free operand");
                    target
                }
            }
        }
    }

    /// Puts `child` into the first empty operand of `target`.
    fn set_operand(&mut self, target: ExprId, child: ExprId) -> bool {
        match &mut self[target].kind {
            ExprKind::Unary { operand, .. } if operand.is_none() => {
                *operand = Some(child);
                true
            }
            ExprKind::Binary { lhs, .. } if lhs.is_none() => {
                *lhs = Some(child);
                true
            }
            ExprKind::Binary { rhs, .. } if rhs.is_none() => {
                *rhs = Some(child);
                true
            }
            _ => false,
        }
    }

    /// `node` takes `child` as its operand. Fails when `node` is a value or a
    /// fully populated operator.
    fn absorb(&mut self, node: ExprId, child: ExprId) -> bool {
        self[node].is_operator() && self.set_operand(node, child)
    }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod builder_test;
