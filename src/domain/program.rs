/// Direction of the objective
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverDirection {
    Maximize,
    Minimize,
}

/// Row sense of a linear constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessEqual,
    GreaterEqual,
    Equal,
}

/// A decision variable
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramVariable {
    pub id: String,
    pub lower: f64,
    /// `None` means unbounded above
    pub upper: Option<f64>,
    pub integer: bool,
    pub objective: f64,
}

/// Matrix shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub nrows: usize,
    pub ncols: usize,
}

/// Constraint matrix in coordinate format
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
    pub vals: Vec<f64>,
    pub shape: Shape,
}

impl SparseMatrix {
    pub fn new(ncols: usize) -> Self {
        SparseMatrix {
            rows: Vec::new(),
            cols: Vec::new(),
            vals: Vec::new(),
            shape: Shape { nrows: 0, ncols },
        }
    }

    /// Entries grouped per row as `(col, val)` pairs.
    pub fn row_entries(&self) -> Vec<Vec<(usize, f64)>> {
        let mut row_data: Vec<Vec<(usize, f64)>> = vec![Vec::new(); self.shape.nrows];
        for i in 0..self.rows.len() {
            let row = self.rows[i];
            let col = self.cols[i];
            if row < self.shape.nrows && col < self.shape.ncols {
                row_data[row].push((col, self.vals[i]));
            }
        }
        row_data
    }
}

/// A linear program over named variables:
/// optimise `c.x` subject to `A x (<=|>=|=) b` and variable bounds.
///
/// Solver backends consume this type; nothing in it is specific to
/// distribution networks.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    pub variables: Vec<ProgramVariable>,
    pub a: SparseMatrix,
    pub comparisons: Vec<Comparison>,
    pub b: Vec<f64>,
    pub direction: SolverDirection,
}

impl LinearProgram {
    pub fn new(direction: SolverDirection) -> Self {
        LinearProgram {
            variables: Vec::new(),
            a: SparseMatrix::new(0),
            comparisons: Vec::new(),
            b: Vec::new(),
            direction,
        }
    }

    /// Add a variable and return its column index.
    pub fn add_variable(&mut self, variable: ProgramVariable) -> usize {
        self.variables.push(variable);
        self.a.shape.ncols = self.variables.len();
        self.variables.len() - 1
    }

    /// Add the row `sum(coef * x[col]) cmp rhs` and return its index.
    /// Zero coefficients are dropped.
    pub fn add_constraint(
        &mut self,
        terms: impl IntoIterator<Item = (usize, f64)>,
        comparison: Comparison,
        rhs: f64,
    ) -> usize {
        let row = self.a.shape.nrows;
        for (col, val) in terms {
            if val != 0.0 {
                self.a.rows.push(row);
                self.a.cols.push(col);
                self.a.vals.push(val);
            }
        }
        self.a.shape.nrows += 1;
        self.comparisons.push(comparison);
        self.b.push(rhs);
        row
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.a.shape.nrows
    }

    pub fn has_integer_variables(&self) -> bool {
        self.variables.iter().any(|v| v.integer)
    }

    /// Objective value of a full assignment given in column order.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(values)
            .map(|(var, value)| var.objective * value)
            .sum()
    }
}
