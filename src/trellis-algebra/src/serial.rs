//! Serializable structural form of relation trees.
//!
//! Trees serialize to a nested document: each node is a map tagged by its
//! variant (`"type"`), holding its child documents and metadata. Behavioral
//! terms and reference-leaf payloads are engine-side objects and never
//! serialize; the document keeps their declarations (name, required
//! columns, direction) and a [`TermReader`] reattaches live terms while
//! reading. Reading rebuilds through the factories, so a tampered document
//! fails the same validation a hand-built tree would.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use common_error::{TrellisError, TrellisResult};
use trellis_core::{ColumnSet, EngineTag, JoinCondition, OrderByTerm, Predicate, Row};

use crate::ops::{Leaf, RelationOp};
use crate::relation::Relation;

/// Declaration of a predicate in the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateDoc {
    /// Term name.
    pub name: String,
    /// Columns the term requires.
    pub columns: ColumnSet,
}

/// Declaration of a join condition in the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionDoc {
    /// Term name.
    pub name: String,
    /// Columns the term requires.
    pub columns: ColumnSet,
}

/// Declaration of an order term in the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByDoc {
    /// Term name.
    pub name: String,
    /// Columns the term requires.
    pub columns: ColumnSet,
    /// Sort direction.
    pub ascending: bool,
}

/// Serializable mirror of a relation tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelationDoc {
    /// A leaf; embeds rows only for embedded-row leaves.
    Leaf {
        name: String,
        engine: EngineTag,
        columns: ColumnSet,
        unique_rows: bool,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        parameters: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rows: Option<Vec<Row>>,
    },
    /// A join of two operand documents.
    Join {
        lhs: Box<RelationDoc>,
        rhs: Box<RelationDoc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<ConditionDoc>,
    },
    /// A selection.
    Selection {
        base: Box<RelationDoc>,
        predicate: PredicateDoc,
    },
    /// A projection.
    Projection {
        base: Box<RelationDoc>,
        columns: ColumnSet,
    },
    /// A distinct.
    Distinct { base: Box<RelationDoc> },
    /// A slice.
    Slice {
        base: Box<RelationDoc>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        order_by: Vec<OrderByDoc>,
        offset: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
    },
    /// A union of operand documents.
    Union { operands: Vec<RelationDoc> },
    /// A transfer.
    Transfer {
        base: Box<RelationDoc>,
        destination: EngineTag,
    },
    /// An extension, kept as its name plus payload-provided extras.
    Extension {
        base: Box<RelationDoc>,
        name: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        extra: BTreeMap<String, serde_json::Value>,
    },
}

/// Rebuilds engine-side objects while reading a serialized tree.
///
/// States cannot travel in documents, so the reader supplies them: given a
/// term's declaration and the engine of the relation it applies to, it
/// returns a live term. Extensions default to an error because their
/// payloads are inherently application-defined.
pub trait TermReader {
    /// Rebuild a predicate for a relation on `engine`.
    fn read_predicate(&self, engine: &EngineTag, doc: &PredicateDoc) -> TrellisResult<Predicate>;

    /// Rebuild a join condition for a join on `engine`.
    fn read_join_condition(
        &self,
        engine: &EngineTag,
        doc: &ConditionDoc,
    ) -> TrellisResult<JoinCondition>;

    /// Rebuild an order term for a relation on `engine`.
    fn read_order_by(&self, engine: &EngineTag, doc: &OrderByDoc) -> TrellisResult<OrderByTerm>;

    /// Rebuild an extension node over an already-read base.
    fn read_extension(
        &self,
        base: Relation,
        name: &str,
        extra: &BTreeMap<String, serde_json::Value>,
    ) -> TrellisResult<Relation> {
        let _ = (base, extra);
        Err(TrellisError::serialization(format!(
            "no extension reader registered for '{name}'"
        )))
    }
}

/// Write a relation tree into its serializable form.
pub fn write_relation(relation: &Relation) -> RelationDoc {
    match relation.op() {
        RelationOp::Leaf(leaf) => RelationDoc::Leaf {
            name: leaf.name.clone(),
            engine: leaf.engine.clone(),
            columns: leaf.columns.clone(),
            unique_rows: leaf.unique_rows,
            parameters: leaf.parameters.clone(),
            rows: leaf.embedded_rows().map(|rows| rows.to_vec()),
        },
        RelationOp::Join(op) => RelationDoc::Join {
            lhs: Box::new(write_relation(&op.lhs)),
            rhs: Box::new(write_relation(&op.rhs)),
            condition: op.condition.as_ref().map(|condition| ConditionDoc {
                name: condition.name().to_string(),
                columns: condition.columns_required().clone(),
            }),
        },
        RelationOp::Selection(op) => RelationDoc::Selection {
            base: Box::new(write_relation(&op.base)),
            predicate: PredicateDoc {
                name: op.predicate.name().to_string(),
                columns: op.predicate.columns_required().clone(),
            },
        },
        RelationOp::Projection(op) => RelationDoc::Projection {
            base: Box::new(write_relation(&op.base)),
            columns: op.columns.clone(),
        },
        RelationOp::Distinct(op) => RelationDoc::Distinct {
            base: Box::new(write_relation(&op.base)),
        },
        RelationOp::Slice(op) => RelationDoc::Slice {
            base: Box::new(write_relation(&op.base)),
            order_by: op
                .order_by
                .iter()
                .map(|term| OrderByDoc {
                    name: term.name().to_string(),
                    columns: term.columns_required().clone(),
                    ascending: term.is_ascending(),
                })
                .collect(),
            offset: op.offset,
            limit: op.limit,
        },
        RelationOp::Union(op) => RelationDoc::Union {
            operands: op.operands.iter().map(write_relation).collect(),
        },
        RelationOp::Transfer(op) => RelationDoc::Transfer {
            base: Box::new(write_relation(&op.base)),
            destination: op.destination.clone(),
        },
        RelationOp::Extension(op) => RelationDoc::Extension {
            base: Box::new(write_relation(&op.base)),
            name: op.payload.name().to_string(),
            extra: op.payload.write_extra(),
        },
    }
}

/// Read a relation tree back from its serializable form.
///
/// Rebuilds bottom-up through the factories; every invariant is
/// re-validated on the way.
pub fn read_relation(doc: &RelationDoc, reader: &impl TermReader) -> TrellisResult<Relation> {
    match doc {
        RelationDoc::Leaf {
            name,
            engine,
            columns,
            unique_rows,
            parameters,
            rows,
        } => {
            let mut leaf = match rows {
                Some(rows) => Leaf::rows(name, engine.clone(), columns.clone(), rows.clone()),
                None => Leaf::reference(name, engine.clone(), columns.clone()),
            };
            leaf.unique_rows = *unique_rows;
            leaf.parameters = parameters.clone();
            Relation::leaf(leaf)
        }
        RelationDoc::Join {
            lhs,
            rhs,
            condition,
        } => {
            let lhs = read_relation(lhs, reader)?;
            let rhs = read_relation(rhs, reader)?;
            match condition {
                Some(doc) => {
                    let condition = reader.read_join_condition(lhs.engine(), doc)?;
                    lhs.join_on(&rhs, condition)
                }
                None => lhs.join(&rhs),
            }
        }
        RelationDoc::Selection { base, predicate } => {
            let base = read_relation(base, reader)?;
            let predicate = reader.read_predicate(base.engine(), predicate)?;
            base.select(predicate)
        }
        RelationDoc::Projection { base, columns } => {
            read_relation(base, reader)?.project(columns.clone())
        }
        RelationDoc::Distinct { base } => Ok(read_relation(base, reader)?.distinct()),
        RelationDoc::Slice {
            base,
            order_by,
            offset,
            limit,
        } => {
            let base = read_relation(base, reader)?;
            let order_by = order_by
                .iter()
                .map(|doc| reader.read_order_by(base.engine(), doc))
                .collect::<TrellisResult<Vec<_>>>()?;
            base.slice(order_by, *offset, *limit)
        }
        RelationDoc::Union { operands } => {
            let operands = operands
                .iter()
                .map(|doc| read_relation(doc, reader))
                .collect::<TrellisResult<Vec<_>>>()?;
            Relation::union_all(operands)
        }
        RelationDoc::Transfer { base, destination } => {
            Ok(read_relation(base, reader)?.transfer(destination.clone()))
        }
        RelationDoc::Extension { base, name, extra } => {
            let base = read_relation(base, reader)?;
            reader.read_extension(base, name, extra)
        }
    }
}

/// Serialize a relation tree to JSON.
pub fn to_json(relation: &Relation) -> TrellisResult<String> {
    Ok(serde_json::to_string(&write_relation(relation))?)
}

/// Read a relation tree from JSON.
pub fn from_json(json: &str, reader: &impl TermReader) -> TrellisResult<Relation> {
    let doc: RelationDoc = serde_json::from_str(json)?;
    read_relation(&doc, reader)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// Reattaches a unit state for every term it is asked about.
    struct UnitStates;

    impl TermReader for UnitStates {
        fn read_predicate(
            &self,
            engine: &EngineTag,
            doc: &PredicateDoc,
        ) -> TrellisResult<Predicate> {
            Ok(Predicate::new(doc.name.clone(), doc.columns.clone())
                .with_state(engine.clone(), Arc::new(())))
        }

        fn read_join_condition(
            &self,
            engine: &EngineTag,
            doc: &ConditionDoc,
        ) -> TrellisResult<JoinCondition> {
            Ok(JoinCondition::new(doc.name.clone(), doc.columns.clone())
                .with_state(engine.clone(), Arc::new(())))
        }

        fn read_order_by(
            &self,
            engine: &EngineTag,
            doc: &OrderByDoc,
        ) -> TrellisResult<OrderByTerm> {
            let term = if doc.ascending {
                OrderByTerm::asc(doc.name.clone(), doc.columns.clone())
            } else {
                OrderByTerm::desc(doc.name.clone(), doc.columns.clone())
            };
            Ok(term.with_state(engine.clone(), Arc::new(())))
        }
    }

    fn engine() -> EngineTag {
        EngineTag::new("iteration")
    }

    fn state() -> trellis_core::EngineState {
        Arc::new(())
    }

    fn sample_tree() -> Relation {
        let movies = Relation::leaf(
            Leaf::rows(
                "movies",
                engine(),
                ColumnSet::of(["id", "year"]),
                vec![
                    Row::new().with("id", 1i64).with("year", 1999i64),
                    Row::new().with("id", 2i64).with("year", 2016i64),
                ],
            )
            .with_unique_rows(true),
        )
        .unwrap();
        let ratings = Relation::leaf(Leaf::reference(
            "ratings",
            engine(),
            ColumnSet::of(["id", "stars"]),
        ))
        .unwrap();

        movies
            .join(&ratings)
            .unwrap()
            .select(
                Predicate::new("recent", ColumnSet::of(["year"])).with_state(engine(), state()),
            )
            .unwrap()
            .slice(
                vec![OrderByTerm::desc("by_stars", ColumnSet::of(["stars"]))
                    .with_state(engine(), state())],
                1,
                Some(10),
            )
            .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let tree = sample_tree();
        let json = to_json(&tree).unwrap();
        let back = from_json(&json, &UnitStates).unwrap();

        // Structural equality covers columns, engines, flags, and rows.
        assert_eq!(tree, back);
        assert_eq!(tree.columns(), back.columns());
        assert_eq!(tree.engine(), back.engine());
        assert_eq!(tree.props(), back.props());
    }

    #[test]
    fn test_embedded_rows_survive() {
        let tree = sample_tree();
        let doc = write_relation(&tree);
        let rewritten = write_relation(&read_relation(&doc, &UnitStates).unwrap());
        assert_eq!(doc, rewritten);

        let json = to_json(&tree).unwrap();
        assert!(json.contains("\"rows\""));
        assert!(json.contains("1999"));
    }

    #[test]
    fn test_reference_leaf_serializes_without_rows() {
        let leaf = Relation::leaf(
            Leaf::reference("ratings", engine(), ColumnSet::of(["id", "stars"]))
                .with_parameter("table", "ratings_v3"),
        )
        .unwrap();
        let json = to_json(&leaf).unwrap();
        assert!(!json.contains("\"rows\""));
        assert!(json.contains("ratings_v3"));

        let back = from_json(&json, &UnitStates).unwrap();
        assert_eq!(leaf, back);
    }

    #[test]
    fn test_variant_tags_are_snake_case() {
        let json = to_json(&sample_tree()).unwrap();
        assert!(json.contains("\"type\":\"slice\""));
        assert!(json.contains("\"type\":\"selection\""));
        assert!(json.contains("\"type\":\"join\""));
        assert!(json.contains("\"type\":\"leaf\""));
    }

    #[test]
    fn test_malformed_json_is_a_serialization_error() {
        let err = from_json("{\"type\":\"sandwich\"}", &UnitStates).unwrap_err();
        assert!(matches!(err, TrellisError::Serialization(_)));
    }

    #[test]
    fn test_tampered_document_fails_validation() {
        // A slice with limit 0 deserializes fine but fails the factory.
        let json = r#"{
            "type": "slice",
            "base": {
                "type": "leaf",
                "name": "movies",
                "engine": "iteration",
                "columns": ["id"],
                "unique_rows": false
            },
            "offset": 0,
            "limit": 0
        }"#;
        let err = from_json(json, &UnitStates).unwrap_err();
        assert!(matches!(err, TrellisError::Construction(_)));
    }

    #[test]
    fn test_unknown_extension_errors_by_default() {
        struct NoExtensions;
        impl TermReader for NoExtensions {
            fn read_predicate(
                &self,
                engine: &EngineTag,
                doc: &PredicateDoc,
            ) -> TrellisResult<Predicate> {
                UnitStates.read_predicate(engine, doc)
            }
            fn read_join_condition(
                &self,
                engine: &EngineTag,
                doc: &ConditionDoc,
            ) -> TrellisResult<JoinCondition> {
                UnitStates.read_join_condition(engine, doc)
            }
            fn read_order_by(
                &self,
                engine: &EngineTag,
                doc: &OrderByDoc,
            ) -> TrellisResult<OrderByTerm> {
                UnitStates.read_order_by(engine, doc)
            }
        }

        let json = r#"{
            "type": "extension",
            "name": "window",
            "base": {
                "type": "leaf",
                "name": "movies",
                "engine": "iteration",
                "columns": ["id"],
                "unique_rows": false
            }
        }"#;
        let err = from_json(json, &NoExtensions).unwrap_err();
        assert!(matches!(err, TrellisError::Serialization(_)));
    }
}
