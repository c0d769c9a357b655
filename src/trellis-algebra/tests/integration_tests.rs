//! Integration tests for trellis-algebra
//!
//! These tests cover tree construction across operations without duplicating
//! existing unit tests in individual modules.

use std::sync::Arc;

use proptest::prelude::*;

use common_error::{ConstructionError, TrellisError};
use trellis_algebra::*;
use trellis_core::{ColumnSet, EngineTag, JoinCondition, OrderByTerm, Predicate, Row};

fn iteration() -> EngineTag {
    EngineTag::new("iteration")
}

fn state() -> trellis_core::EngineState {
    Arc::new(())
}

fn movies() -> Relation {
    Relation::leaf(
        Leaf::rows(
            "movies",
            iteration(),
            ColumnSet::of(["movie_id", "title", "year"]),
            vec![
                Row::new()
                    .with("movie_id", 1i64)
                    .with("title", "Arrival")
                    .with("year", 2016i64),
                Row::new()
                    .with("movie_id", 2i64)
                    .with("title", "Gattaca")
                    .with("year", 1997i64),
            ],
        )
        .with_unique_rows(true),
    )
    .unwrap()
}

fn ratings() -> Relation {
    Relation::leaf(Leaf::reference(
        "ratings",
        iteration(),
        ColumnSet::of(["movie_id", "stars"]),
    ))
    .unwrap()
}

#[test]
fn test_tree_construction_across_operations() {
    // Join joins on the shared tag, selection and slice need state for the
    // tree's engine.
    let by_stars =
        OrderByTerm::desc("by_stars", ColumnSet::of(["stars"])).with_state(iteration(), state());
    let recent =
        Predicate::new("recent", ColumnSet::of(["year"])).with_state(iteration(), state());

    let joined = movies().join(&ratings()).unwrap();
    assert_eq!(
        joined.columns(),
        &ColumnSet::of(["movie_id", "title", "year", "stars"])
    );
    assert!(!joined.props().unique_rows);

    let tree = joined
        .select(recent)
        .unwrap()
        .project(ColumnSet::of(["title", "stars"]))
        .unwrap()
        .distinct()
        .slice(vec![by_stars], 0, Some(10))
        .unwrap();

    assert_eq!(tree.columns(), &ColumnSet::of(["title", "stars"]));
    assert!(tree.props().unique_rows);
    assert!(tree.props().fully_ordered);
    assert_eq!(tree.engine(), &iteration());

    // The rendered tree reads top-down.
    let rendered = tree.to_string();
    let slice_at = rendered.find("Slice").unwrap();
    let leaf_at = rendered.find("'movies'").unwrap();
    assert!(slice_at < leaf_at);
}

#[test]
fn test_identity_shortcuts_avoid_useless_nodes() {
    let base = movies();

    // Projection to the full column set is the base itself.
    let full = base.project(base.columns().clone()).unwrap();
    assert!(full.ptr_eq(&base));

    // Distinct over already-unique rows is the base itself.
    assert!(base.distinct().ptr_eq(&base));

    // Transfer to the current engine is the base itself.
    assert!(base.transfer(iteration()).ptr_eq(&base));
}

#[test]
fn test_engine_boundaries_require_transfers() {
    let warehouse = Relation::leaf(Leaf::reference(
        "ratings",
        "sql",
        ColumnSet::of(["movie_id", "stars"]),
    ))
    .unwrap();

    let err = movies().join(&warehouse).unwrap_err();
    assert!(err.is_construction());
    assert!(err.to_string().contains("transfer"));

    // Moving the operand over fixes the join and records both engines.
    let moved = warehouse.transfer(iteration());
    let joined = movies().join(&moved).unwrap();
    assert_eq!(joined.engine(), &iteration());
    let engines = joined.engines();
    assert!(engines.contains(&EngineTag::new("sql")));
    assert!(engines.contains(&iteration()));
}

#[test]
fn test_transfer_resolution_produces_single_engine_trees() {
    let warehouse = Relation::leaf(Leaf::reference(
        "ratings",
        "sql",
        ColumnSet::of(["movie_id", "stars"]),
    ))
    .unwrap();
    let tree = movies().join(&warehouse.transfer(iteration())).unwrap();

    let resolver = TransferResolver::new().with_transfer(
        "sql",
        "iteration",
        Arc::new(|base: &Relation| {
            Relation::leaf(Leaf::reference(
                "fetched",
                "iteration",
                base.columns().clone(),
            ))
        }),
    );

    let resolved = resolver.resolve(&tree).unwrap();
    assert_eq!(resolved.engines().len(), 1);
    assert_eq!(resolved.columns(), tree.columns());
}

#[test]
fn test_construction_errors_name_the_problem() {
    // Leaf with no columns.
    let err = Relation::leaf(Leaf::reference("empty", iteration(), ColumnSet::default()))
        .unwrap_err();
    assert!(matches!(
        err,
        TrellisError::Construction(ConstructionError::EmptyColumns(_))
    ));

    // Projection to a column the base lacks.
    let err = movies().project(ColumnSet::of(["director"])).unwrap_err();
    assert!(matches!(
        err,
        TrellisError::Construction(ConstructionError::ColumnMismatch(_))
    ));
    assert!(err.to_string().contains("director"));

    // Predicate on a missing column.
    let err = movies()
        .select(Predicate::new("how", ColumnSet::of(["budget"])).with_state(iteration(), state()))
        .unwrap_err();
    assert!(err.to_string().contains("budget"));

    // Predicate without state for the engine.
    let err = movies()
        .select(Predicate::new("recent", ColumnSet::of(["year"])))
        .unwrap_err();
    assert!(matches!(
        err,
        TrellisError::Construction(ConstructionError::MissingEngineState(_))
    ));

    // Union of mismatched columns.
    let err = movies().union(&ratings()).unwrap_err();
    assert!(matches!(
        err,
        TrellisError::Construction(ConstructionError::ColumnMismatch(_))
    ));

    // Union of a single operand.
    let err = Relation::union_all([movies()]).unwrap_err();
    assert!(matches!(
        err,
        TrellisError::Construction(ConstructionError::TooFewOperands(_))
    ));

    // Slice that can never hold a row.
    let err = movies().slice(Vec::new(), 0, Some(0)).unwrap_err();
    assert!(matches!(
        err,
        TrellisError::Construction(ConstructionError::InvalidBounds(_))
    ));
}

#[test]
fn test_property_propagation() {
    let movies = movies();
    assert!(movies.props().unique_rows);
    assert!(!movies.props().at_most_one_row);

    // Positional slice with limit 1 bounds cardinality without ordering.
    let top = movies.slice(Vec::new(), 0, Some(1)).unwrap();
    assert!(top.props().at_most_one_row);
    assert!(!top.props().fully_ordered);

    // Joining two single-row relations stays single-row and unique.
    let other = Relation::leaf(
        Leaf::rows(
            "premiere",
            iteration(),
            ColumnSet::of(["movie_id", "venue"]),
            vec![Row::new().with("movie_id", 1i64).with("venue", "Venice")],
        )
        .with_unique_rows(true),
    )
    .unwrap();
    assert!(other.props().at_most_one_row);
    let joined = top.join(&other).unwrap();
    assert!(joined.props().at_most_one_row);
    assert!(joined.props().unique_rows);

    // Projection can introduce duplicates.
    let titles = movies.project(ColumnSet::of(["title"])).unwrap();
    assert!(!titles.props().unique_rows);
}

#[test]
fn test_document_round_trip_with_reattached_states() {
    struct Reattach;
    impl TermReader for Reattach {
        fn read_predicate(
            &self,
            engine: &EngineTag,
            doc: &serial::PredicateDoc,
        ) -> common_error::TrellisResult<Predicate> {
            Ok(Predicate::new(doc.name.clone(), doc.columns.clone())
                .with_state(engine.clone(), Arc::new(())))
        }
        fn read_join_condition(
            &self,
            engine: &EngineTag,
            doc: &serial::ConditionDoc,
        ) -> common_error::TrellisResult<JoinCondition> {
            Ok(JoinCondition::new(doc.name.clone(), doc.columns.clone())
                .with_state(engine.clone(), Arc::new(())))
        }
        fn read_order_by(
            &self,
            engine: &EngineTag,
            doc: &serial::OrderByDoc,
        ) -> common_error::TrellisResult<OrderByTerm> {
            let term = if doc.ascending {
                OrderByTerm::asc(doc.name.clone(), doc.columns.clone())
            } else {
                OrderByTerm::desc(doc.name.clone(), doc.columns.clone())
            };
            Ok(term.with_state(engine.clone(), Arc::new(())))
        }
    }

    let tree = movies()
        .join_on(
            &ratings(),
            JoinCondition::new("same_era", ColumnSet::of(["year", "stars"]))
                .with_state(iteration(), state()),
        )
        .unwrap()
        .select(Predicate::new("recent", ColumnSet::of(["year"])).with_state(iteration(), state()))
        .unwrap();

    let back = from_json(&to_json(&tree).unwrap(), &Reattach).unwrap();
    assert_eq!(tree, back);
    assert_eq!(tree.props(), back.props());

    // Embedded rows and the declared uniqueness flag both survive.
    let RelationOp::Selection(selection) = back.op() else {
        panic!("expected selection root");
    };
    let RelationOp::Join(join) = selection.base.op() else {
        panic!("expected join under the selection");
    };
    let RelationOp::Leaf(leaf) = join.lhs.op() else {
        panic!("expected leaf under the join");
    };
    assert_eq!(leaf.embedded_rows().map(|rows| rows.len()), Some(2));
    assert!(leaf.unique_rows);
}

proptest! {
    #[test]
    fn test_join_columns_are_the_operand_union(
        lhs_cols in proptest::collection::btree_set("[a-d]", 1..4),
        rhs_cols in proptest::collection::btree_set("[c-f]", 1..4),
    ) {
        let lhs: ColumnSet = lhs_cols.iter().map(|name| name.as_str().into()).collect();
        let rhs: ColumnSet = rhs_cols.iter().map(|name| name.as_str().into()).collect();

        let left = Relation::leaf(Leaf::reference("left", "iteration", lhs.clone())).unwrap();
        let right = Relation::leaf(Leaf::reference("right", "iteration", rhs.clone())).unwrap();

        let joined = left.join(&right).unwrap();
        prop_assert_eq!(joined.columns(), &lhs.union(&rhs));
    }

    #[test]
    fn test_union_of_identical_shapes_always_builds(operands in 2usize..6) {
        let relations: Vec<Relation> = (0..operands)
            .map(|index| {
                Relation::leaf(Leaf::reference(
                    format!("part_{index}"),
                    "iteration",
                    ColumnSet::of(["id"]),
                ))
                .unwrap()
            })
            .collect();

        let union = Relation::union_all(relations).unwrap();
        prop_assert_eq!(union.op().children().len(), operands);
        prop_assert_eq!(union.columns(), &ColumnSet::of(["id"]));
    }
}
