//! Hidden Markov Model parameters and the `N.dat`/`A.dat`/`B.dat` loader.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::codec::HexPolicy;
use crate::error::{GoldenError, Result};

/// Discrete HMM with single-precision log-probability tables.
///
/// Built once and shared read-only by every decode call.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    n_states: usize,
    n_symbols: usize,
    /// `(n_states + 1) x n_states`, row-major. Row 0 is start -> j,
    /// row `i + 1` is i -> j.
    transition: Vec<f32>,
    /// `n_states x n_symbols`, row-major; column k is symbol `k + 1`.
    emission: Vec<f32>,
}

impl Model {
    /// Build a model from row-major tables, checking their dimensions.
    pub fn new(
        n_states: usize,
        n_symbols: usize,
        transition: Vec<f32>,
        emission: Vec<f32>,
    ) -> Result<Self> {
        if n_states == 0 || n_symbols == 0 {
            return Err(GoldenError::ModelFormat {
                file: "<model>".to_string(),
                line: 0,
                reason: format!("N and M must be positive, got N={n_states} M={n_symbols}"),
            });
        }
        let (want_a, want_b) = table_sizes(n_states, n_symbols).ok_or_else(|| {
            GoldenError::ModelFormat {
                file: "<model>".to_string(),
                line: 0,
                reason: format!("N*M too large: N={n_states} M={n_symbols}"),
            }
        })?;
        if transition.len() != want_a || emission.len() != want_b {
            return Err(GoldenError::ModelFormat {
                file: "<model>".to_string(),
                line: 0,
                reason: format!(
                    "table sizes {}x{} do not match N={n_states} M={n_symbols} (expected {want_a} and {want_b})",
                    transition.len(),
                    emission.len()
                ),
            });
        }
        Ok(Self {
            n_states,
            n_symbols,
            transition,
            emission,
        })
    }

    /// Number of hidden states N.
    #[inline]
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Number of observation symbols M.
    #[inline]
    pub fn n_symbols(&self) -> usize {
        self.n_symbols
    }

    /// log P(start -> j).
    #[inline]
    pub fn start(&self, j: usize) -> f32 {
        self.transition[j]
    }

    /// log P(i -> j).
    #[inline]
    pub fn transition(&self, i: usize, j: usize) -> f32 {
        self.transition[(i + 1) * self.n_states + j]
    }

    /// log P(state j emits symbol index k), with `k` 0-based.
    #[inline]
    pub fn emission(&self, j: usize, k: usize) -> f32 {
        self.emission[j * self.n_symbols + k]
    }

    /// Raw `(N+1) x N` transition table, row-major.
    pub fn transition_table(&self) -> &[f32] {
        &self.transition
    }

    /// Raw `N x M` emission table, row-major.
    pub fn emission_table(&self) -> &[f32] {
        &self.emission
    }
}

/// Entry counts of the transition and emission tables, `None` on overflow.
fn table_sizes(n_states: usize, n_symbols: usize) -> Option<(usize, usize)> {
    let a = n_states.checked_add(1)?.checked_mul(n_states)?;
    let b = n_states.checked_mul(n_symbols)?;
    Some((a, b))
}

/// Locations of the three model files.
#[derive(Clone, Debug)]
pub struct ModelPaths<'a> {
    pub n_file: &'a Path,
    pub a_file: &'a Path,
    pub b_file: &'a Path,
}

/// Load a model from `N.dat`, `A.dat` and `B.dat`, rejecting malformed tokens.
pub fn load_model(n_file: &Path, a_file: &Path, b_file: &Path) -> Result<Model> {
    load_model_with_policy(
        ModelPaths {
            n_file,
            a_file,
            b_file,
        },
        HexPolicy::Strict,
    )
}

/// Load a model from disk using an explicit hex failure policy.
pub fn load_model_with_policy(paths: ModelPaths<'_>, policy: HexPolicy) -> Result<Model> {
    let open = |path: &Path| -> Result<BufReader<File>> {
        File::open(path)
            .map(BufReader::new)
            .map_err(|e| GoldenError::file(path, e))
    };
    let model = load_model_from_readers(
        Named::new(paths.n_file, open(paths.n_file)?),
        Named::new(paths.a_file, open(paths.a_file)?),
        Named::new(paths.b_file, open(paths.b_file)?),
        policy,
    )?;
    tracing::info!(
        n_states = model.n_states,
        n_symbols = model.n_symbols,
        "loaded model"
    );
    Ok(model)
}

/// A reader tagged with the file name used in diagnostics.
pub struct Named<R> {
    name: String,
    reader: R,
}

impl<R: BufRead> Named<R> {
    pub fn new(name: impl AsRef<Path>, reader: R) -> Self {
        Self {
            name: name.as_ref().display().to_string(),
            reader,
        }
    }
}

/// Parse a model from three already-open readers.
pub fn load_model_from_readers<R1, R2, R3>(
    n: Named<R1>,
    a: Named<R2>,
    b: Named<R3>,
    policy: HexPolicy,
) -> Result<Model>
where
    R1: BufRead,
    R2: BufRead,
    R3: BufRead,
{
    let (n_states, n_symbols) = read_dimensions(n)?;
    let transition = read_table(a, "transition", n_states + 1, n_states, policy)?;
    let emission = read_table(b, "emission", n_states, n_symbols, policy)?;
    Model::new(n_states, n_symbols, transition, emission)
}

fn read_dimensions<R: BufRead>(src: Named<R>) -> Result<(usize, usize)> {
    let Named { name, reader } = src;
    let mut values = Vec::with_capacity(2);
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| GoldenError::file(&name, e))?;
        let token = line.trim();
        if values.len() == 2 {
            if token.is_empty() {
                continue;
            }
            return Err(GoldenError::ModelFormat {
                file: name,
                line: idx + 1,
                reason: format!("unexpected extra line '{token}' after N and M"),
            });
        }
        let label = if values.is_empty() { "N" } else { "M" };
        let value = token
            .parse::<usize>()
            .ok()
            .filter(|&v| v > 0)
            .ok_or_else(|| GoldenError::ModelFormat {
                file: name.clone(),
                line: idx + 1,
                reason: format!("{label} must be a positive decimal integer, got '{token}'"),
            })?;
        values.push(value);
    }
    match values[..] {
        [n, m] if table_sizes(n, m).is_none() => Err(GoldenError::ModelFormat {
            file: name,
            line: 1,
            reason: format!("N*M too large: N={n} M={m}"),
        }),
        [n, m] => Ok((n, m)),
        _ => Err(GoldenError::ModelFormat {
            file: name,
            line: values.len() + 1,
            reason: "expected two lines (N then M)".to_string(),
        }),
    }
}

const MAX_PREALLOC: usize = 4096;

fn read_table<R: BufRead>(
    src: Named<R>,
    table: &'static str,
    rows: usize,
    cols: usize,
    policy: HexPolicy,
) -> Result<Vec<f32>> {
    let Named { name, reader } = src;
    let _span = tracing::debug_span!("load_table", file = %name, table, rows, cols).entered();
    let expected = rows
        .checked_mul(cols)
        .ok_or_else(|| GoldenError::ModelFormat {
            file: name.clone(),
            line: 1,
            reason: format!("N*M too large for a {rows}x{cols} {table} table"),
        })?;
    // The file's real length decides how far this grows.
    let mut values = Vec::with_capacity(expected.min(MAX_PREALLOC));
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| GoldenError::file(&name, e))?;
        let token = line.trim();
        if values.len() == expected {
            if token.is_empty() {
                continue;
            }
            return Err(GoldenError::ModelFormat {
                file: name,
                line: idx + 1,
                reason: format!("expected {expected} entries for a {rows}x{cols} {table} table, found more"),
            });
        }
        let (row, col) = (values.len() / cols, values.len() % cols);
        let value = policy
            .decode(token)
            .map_err(|_| GoldenError::MalformedModelToken {
                file: name.clone(),
                line: idx + 1,
                table,
                row,
                col,
                token: token.to_string(),
            })?;
        values.push(value);
    }
    if values.len() != expected {
        return Err(GoldenError::ModelFormat {
            file: name,
            line: values.len() + 1,
            reason: format!(
                "expected {expected} entries for a {rows}x{cols} {table} table, found {}",
                values.len()
            ),
        });
    }
    Ok(values)
}
