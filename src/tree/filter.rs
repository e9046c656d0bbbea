//! Filter compilation for walks
//!
//! A [`Filter`] is either a list of `.gitignore`-style patterns or a custom
//! predicate. Compiling it yields a [`CompiledFilter`], the single inclusion
//! test the storage backend applies to every walk entry. The backend uses the
//! same compiled filter to decide whether to descend into a directory, so a
//! rejected directory prunes its whole subtree.

use crate::backend::WalkEntry;
use crate::error::{GroveError, Result};
use async_trait::async_trait;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

/// Custom inclusion predicate over walk entries
#[async_trait]
pub trait EntryPredicate: Send + Sync {
    /// Decide whether the entry is included. Errors abort the walk.
    async fn test(&self, entry: &WalkEntry) -> anyhow::Result<bool>;
}

/// Synchronous closure predicate
pub struct PredicateFn<F>(pub F);

#[async_trait]
impl<F> EntryPredicate for PredicateFn<F>
where
    F: Fn(&WalkEntry) -> anyhow::Result<bool> + Send + Sync,
{
    async fn test(&self, entry: &WalkEntry) -> anyhow::Result<bool> {
        (self.0)(entry)
    }
}

/// Asynchronous closure predicate; receives an owned copy of the entry
pub struct AsyncPredicateFn<F>(pub F);

#[async_trait]
impl<F, Fut> EntryPredicate for AsyncPredicateFn<F>
where
    F: Fn(WalkEntry) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
{
    async fn test(&self, entry: &WalkEntry) -> anyhow::Result<bool> {
        (self.0)(entry.clone()).await
    }
}

/// Filter: ignore patterns or a custom predicate
#[derive(Clone)]
pub enum Filter {
    /// `.gitignore`-style patterns; matching entries are excluded
    Patterns(Vec<String>),
    /// Custom predicate; its result is the inclusion decision
    Predicate(Arc<dyn EntryPredicate>),
}

impl Filter {
    pub fn patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::Patterns(patterns.into_iter().map(Into::into).collect())
    }

    /// Infallible synchronous predicate.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&WalkEntry) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Arc::new(PredicateFn(move |entry: &WalkEntry| {
            Ok::<bool, anyhow::Error>(f(entry))
        })))
    }

    /// Synchronous predicate that may fail.
    pub fn try_predicate<F>(f: F) -> Self
    where
        F: Fn(&WalkEntry) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Filter::Predicate(Arc::new(PredicateFn(f)))
    }

    pub fn async_predicate<F, Fut>(f: F) -> Self
    where
        F: Fn(WalkEntry) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        Filter::Predicate(Arc::new(AsyncPredicateFn(f)))
    }

    /// Combine an include filter and an ignore filter into one predicate.
    ///
    /// See [`compile_scoped`] for the evaluation order.
    pub fn scoped(include: Option<Filter>, ignore: Option<Filter>) -> Result<Option<Filter>> {
        let compiled = compile_scoped(include.as_ref(), ignore.as_ref())?;
        Ok(compiled.map(|filter| Filter::Predicate(Arc::new(filter))))
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Patterns(patterns) => f.debug_tuple("Patterns").field(patterns).finish(),
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<Vec<String>> for Filter {
    fn from(patterns: Vec<String>) -> Self {
        Filter::Patterns(patterns)
    }
}

impl From<&[&str]> for Filter {
    fn from(patterns: &[&str]) -> Self {
        Filter::patterns(patterns.iter().copied())
    }
}

/// One compiled filter spec, answering "does this entry match?"
#[derive(Clone)]
enum Matcher {
    Patterns(Arc<Gitignore>),
    Predicate(Arc<dyn EntryPredicate>),
}

impl Matcher {
    fn compile(filter: &Filter) -> Result<Self> {
        match filter {
            Filter::Patterns(patterns) => Ok(Matcher::Patterns(Arc::new(build_gitignore(patterns)?))),
            Filter::Predicate(predicate) => Ok(Matcher::Predicate(Arc::clone(predicate))),
        }
    }

    /// Pattern lists report "is ignored"; predicates report their raw result.
    async fn matches(&self, entry: &WalkEntry) -> Result<bool> {
        match self {
            Matcher::Patterns(gitignore) => Ok(gitignore
                .matched_path_or_any_parents(Path::new(&entry.path), entry.is_directory)
                .is_ignore()),
            Matcher::Predicate(predicate) => {
                predicate
                    .test(entry)
                    .await
                    .map_err(|source| GroveError::FilterEvaluation {
                        path: entry.path.clone(),
                        source,
                    })
            }
        }
    }
}

fn build_gitignore(patterns: &[String]) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new("");
    for pattern in patterns {
        builder
            .add_line(None, pattern)
            .map_err(|e| GroveError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
    }
    builder.build().map_err(|e| GroveError::InvalidPattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}

#[derive(Clone)]
enum Rule {
    /// Patterns exclude matches; predicates decide directly
    Single(Matcher),
    Scoped {
        include: Option<Matcher>,
        ignore: Option<Matcher>,
    },
}

/// Compiled inclusion test handed to the storage backend
#[derive(Clone)]
pub struct CompiledFilter {
    rule: Rule,
}

impl CompiledFilter {
    /// Whether the entry is included. Pure for pattern lists.
    pub async fn accepts(&self, entry: &WalkEntry) -> Result<bool> {
        match &self.rule {
            Rule::Single(matcher @ Matcher::Patterns(_)) => Ok(!matcher.matches(entry).await?),
            Rule::Single(matcher) => matcher.matches(entry).await,
            Rule::Scoped { include, ignore } => {
                if let Some(include) = include {
                    if !include.matches(entry).await? {
                        return Ok(false);
                    }
                }
                if let Some(ignore) = ignore {
                    if ignore.matches(entry).await? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}

impl fmt::Debug for CompiledFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.rule {
            Rule::Single(Matcher::Patterns(_)) => "patterns",
            Rule::Single(Matcher::Predicate(_)) => "predicate",
            Rule::Scoped { .. } => "scoped",
        };
        f.debug_struct("CompiledFilter").field("kind", &kind).finish()
    }
}

#[async_trait]
impl EntryPredicate for CompiledFilter {
    async fn test(&self, entry: &WalkEntry) -> anyhow::Result<bool> {
        Ok(self.accepts(entry).await?)
    }
}

/// Compile a filter spec. `None` means "accept everything".
pub fn compile(filter: Option<&Filter>) -> Result<Option<CompiledFilter>> {
    filter
        .map(|filter| {
            Ok(CompiledFilter {
                rule: Rule::Single(Matcher::compile(filter)?),
            })
        })
        .transpose()
}

/// Compile an include spec and an ignore spec into one filter.
///
/// Per entry: a present `include` that does not match rejects immediately;
/// otherwise a present `ignore` that matches rejects; everything else is
/// accepted. Pattern lists count as matching when the ignore matcher would
/// ignore the path.
pub fn compile_scoped(
    include: Option<&Filter>,
    ignore: Option<&Filter>,
) -> Result<Option<CompiledFilter>> {
    if include.is_none() && ignore.is_none() {
        return Ok(None);
    }
    Ok(Some(CompiledFilter {
        rule: Rule::Scoped {
            include: include.map(Matcher::compile).transpose()?,
            ignore: ignore.map(Matcher::compile).transpose()?,
        },
    }))
}
