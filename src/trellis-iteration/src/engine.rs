//! The iteration engine: bindings, configuration, and execution entry.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use common_error::{unsupported, TrellisError, TrellisResult};
use trellis_algebra::ops::ExtensionBehavior;
use trellis_algebra::{Relation, RelationProps};
use trellis_core::{
    ColumnSet, EngineTag, JoinCondition, OrderByTerm, Predicate, Row, Value,
};

use crate::collection::RowCollection;
use crate::exec::ExecutionVisitor;
use crate::rows::{BoxedRows, RowIterable};
use crate::terms::{JoinMatch, RowCondition, RowPredicate, RowSortKey};

/// Tuning knobs for an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    /// Ceiling on rows any single operation may materialize; `None` is
    /// unbounded. Exceeding it fails the execution with a row-limit
    /// error naming the operation.
    pub max_materialized_rows: Option<usize>,
}

impl EngineConfig {
    /// Create a config with no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the materialization ceiling.
    #[must_use]
    pub fn with_max_materialized_rows(mut self, limit: usize) -> Self {
        self.max_materialized_rows = Some(limit);
        self
    }
}

/// A row source bound to a leaf name.
enum LeafBinding {
    /// Restartable rows; every execution gets a fresh pass.
    Collection(RowCollection),
    /// A single-pass source; the first execution that reaches the leaf
    /// takes it.
    Stream(Option<BoxedRows>),
}

/// Produces this engine's rows for a relation held by another engine.
///
/// Exporters back `Transfer` nodes: when execution reaches a transfer
/// into this engine, the exporter registered for the child's engine tag
/// is asked to turn the child relation into rows.
pub trait RowExporter: Send + Sync {
    /// Evaluate `relation` by the source engine's means and hand its rows
    /// over.
    fn export(&self, relation: &Relation) -> TrellisResult<BoxedRows>;
}

type ExtensionFn = Arc<dyn Fn(BoxedRows) -> TrellisResult<BoxedRows> + Send + Sync>;

/// An extension operation this engine knows how to run.
///
/// The payload rides a relation tree's `Extension` node like any other
/// [`ExtensionBehavior`]; at execution time the engine downcasts the
/// payload to this type and feeds the base's rows through `evaluate`.
/// Payloads of any other type are unsupported operations here.
pub struct IterationExtension {
    name: String,
    columns: Option<ColumnSet>,
    props: Option<RelationProps>,
    evaluate: ExtensionFn,
}

impl IterationExtension {
    /// Create an extension that passes columns and properties through.
    pub fn new(
        name: impl Into<String>,
        evaluate: impl Fn(BoxedRows) -> TrellisResult<BoxedRows> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            columns: None,
            props: None,
            evaluate: Arc::new(evaluate),
        }
    }

    /// Override the output columns.
    #[must_use]
    pub fn with_columns(mut self, columns: ColumnSet) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Override the output properties.
    #[must_use]
    pub fn with_props(mut self, props: RelationProps) -> Self {
        self.props = Some(props);
        self
    }

    /// Feed the base's rows through the extension.
    pub fn apply(&self, base: BoxedRows) -> TrellisResult<BoxedRows> {
        (self.evaluate)(base)
    }
}

impl fmt::Debug for IterationExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterationExtension")
            .field("name", &self.name)
            .field("columns", &self.columns)
            .field("props", &self.props)
            .finish()
    }
}

impl ExtensionBehavior for IterationExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn columns(&self, base: &ColumnSet) -> ColumnSet {
        self.columns.clone().unwrap_or_else(|| base.clone())
    }

    fn props(&self, base: RelationProps) -> RelationProps {
        self.props.unwrap_or(base)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The native in-memory execution engine.
///
/// An engine is a plain value identified by its tag: relations tagged
/// with it execute here, everything else is somebody else's job. It
/// holds the row sources its reference leaves resolve to, the exporters
/// that feed transfers from other engines, and the config for one
/// execution at a time.
///
/// The engine also mints behavioral terms: [`IterationEngine::predicate`]
/// and friends attach callables over [`Row`]s as term state under this
/// engine's tag, which is the state the execution path later resolves.
pub struct IterationEngine {
    tag: EngineTag,
    config: EngineConfig,
    bindings: HashMap<String, LeafBinding>,
    exporters: HashMap<EngineTag, Arc<dyn RowExporter>>,
}

impl IterationEngine {
    /// Create an engine with the conventional `iteration` tag.
    pub fn new() -> Self {
        Self::with_tag("iteration")
    }

    /// Create an engine with a custom tag.
    pub fn with_tag(tag: impl Into<EngineTag>) -> Self {
        Self {
            tag: tag.into(),
            config: EngineConfig::default(),
            bindings: HashMap::new(),
            exporters: HashMap::new(),
        }
    }

    /// Replace the engine's config.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The tag relations must carry to execute here.
    pub fn tag(&self) -> &EngineTag {
        &self.tag
    }

    /// The engine's current config.
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Bind rows to a leaf name, restartable across executions.
    pub fn bind_rows(&mut self, name: impl Into<String>, rows: Vec<Row>) {
        self.bind_collection(name, RowCollection::new(rows));
    }

    /// Bind an existing collection to a leaf name.
    pub fn bind_collection(&mut self, name: impl Into<String>, collection: RowCollection) {
        self.bindings
            .insert(name.into(), LeafBinding::Collection(collection));
    }

    /// Bind a single-pass source to a leaf name.
    ///
    /// The first execution that reaches the leaf consumes the source; a
    /// second reach is a source-exhausted error until the name is bound
    /// again.
    pub fn bind_stream(&mut self, name: impl Into<String>, source: BoxedRows) {
        self.bindings
            .insert(name.into(), LeafBinding::Stream(Some(source)));
    }

    /// Drop the binding for a leaf name.
    pub fn unbind(&mut self, name: &str) {
        self.bindings.remove(name);
    }

    /// Register the exporter that feeds transfers out of `source`.
    pub fn register_exporter(
        &mut self,
        source: impl Into<EngineTag>,
        exporter: Arc<dyn RowExporter>,
    ) {
        self.exporters.insert(source.into(), exporter);
    }

    pub(crate) fn resolve_leaf(&mut self, name: &str) -> TrellisResult<BoxedRows> {
        match self.bindings.get_mut(name) {
            Some(LeafBinding::Collection(collection)) => Ok(Box::new(collection.restarted())),
            Some(LeafBinding::Stream(slot)) => slot.take().ok_or_else(|| {
                TrellisError::source_exhausted(format!(
                    "stream bound to leaf '{name}' was already consumed"
                ))
            }),
            None => Err(TrellisError::unresolved_leaf(format!(
                "no row source bound for leaf '{name}'"
            ))),
        }
    }

    pub(crate) fn exporter_for(&self, source: &EngineTag) -> Option<Arc<dyn RowExporter>> {
        self.exporters.get(source).cloned()
    }

    /// Execute a relation of this engine, producing its rows lazily.
    ///
    /// The tree is walked once, bottom-up, yielding one row source per
    /// node; pulling the returned source drives the whole pipeline. A
    /// relation tagged for another engine is unsupported here; transfers
    /// whose destination is this engine resolve through the registered
    /// exporters.
    pub fn execute(&mut self, relation: &Relation) -> TrellisResult<BoxedRows> {
        if relation.engine() != &self.tag {
            unsupported!(
                "engine '{}' cannot execute a relation on engine '{}'",
                self.tag,
                relation.engine()
            );
        }
        let mut visitor = ExecutionVisitor { engine: self };
        relation.visit(&mut visitor)
    }

    /// Execute a relation and drain its rows into a vector.
    pub fn collect(&mut self, relation: &Relation) -> TrellisResult<Vec<Row>> {
        self.execute(relation)?.collect_rows()
    }

    /// Build a predicate whose state for this engine is `test`.
    ///
    /// A failure inside `test` surfaces as a term-evaluation error
    /// carrying the predicate's name.
    pub fn predicate(
        &self,
        name: impl Into<String>,
        columns_required: ColumnSet,
        test: impl Fn(&Row) -> TrellisResult<bool> + Send + Sync + 'static,
    ) -> Predicate {
        let name = name.into();
        let context = name.clone();
        let state: RowPredicate = Arc::new(move |row: &Row| {
            test(row).map_err(|e| {
                TrellisError::term_evaluation(format!("predicate '{context}': {e}"))
            })
        });
        Predicate::new(name, columns_required).with_state(self.tag.clone(), Arc::new(state))
    }

    /// Build a join condition whose state for this engine is `decide`.
    pub fn join_condition(
        &self,
        name: impl Into<String>,
        columns_required: ColumnSet,
        decide: impl Fn(&Row) -> TrellisResult<JoinMatch> + Send + Sync + 'static,
    ) -> JoinCondition {
        let name = name.into();
        let context = name.clone();
        let state: RowCondition = Arc::new(move |row: &Row| {
            decide(row).map_err(|e| {
                TrellisError::term_evaluation(format!("join condition '{context}': {e}"))
            })
        });
        JoinCondition::new(name, columns_required).with_state(self.tag.clone(), Arc::new(state))
    }

    /// Build an ascending order term whose sort key is `key`.
    pub fn order_by_asc(
        &self,
        name: impl Into<String>,
        columns_required: ColumnSet,
        key: impl Fn(&Row) -> TrellisResult<Value> + Send + Sync + 'static,
    ) -> OrderByTerm {
        let name = name.into();
        let term = OrderByTerm::asc(name.clone(), columns_required);
        term.with_state(self.tag.clone(), Self::sort_state(name, key))
    }

    /// Build a descending order term whose sort key is `key`.
    pub fn order_by_desc(
        &self,
        name: impl Into<String>,
        columns_required: ColumnSet,
        key: impl Fn(&Row) -> TrellisResult<Value> + Send + Sync + 'static,
    ) -> OrderByTerm {
        let name = name.into();
        let term = OrderByTerm::desc(name.clone(), columns_required);
        term.with_state(self.tag.clone(), Self::sort_state(name, key))
    }

    fn sort_state(
        name: String,
        key: impl Fn(&Row) -> TrellisResult<Value> + Send + Sync + 'static,
    ) -> Arc<RowSortKey> {
        let state: RowSortKey = Arc::new(move |row: &Row| {
            key(row)
                .map_err(|e| TrellisError::term_evaluation(format!("order term '{name}': {e}")))
        });
        Arc::new(state)
    }
}

impl Default for IterationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IterationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bindings: Vec<_> = self.bindings.keys().cloned().collect();
        bindings.sort();
        let mut exporters: Vec<_> = self.exporters.keys().map(ToString::to_string).collect();
        exporters.sort();
        f.debug_struct("IterationEngine")
            .field("tag", &self.tag)
            .field("config", &self.config)
            .field("bindings", &bindings)
            .field("exporters", &exporters)
            .finish()
    }
}
