//! Regression trees shared by the bagging and boosting candidates
//!
//! Trees grow best-first: the open leaf whose best split reduces squared
//! error the most is split next, until no split helps or a depth / leaf
//! limit is reached. With no leaf limit this yields the same tree as
//! depth-first CART growth.

use crate::features::FEATURE_COUNT;

/// Feature vector of one row
pub type Row = [f64; FEATURE_COUNT];

/// Smallest gain treated as an improvement
const MIN_GAIN: f64 = 1e-12;

/// Growth limits and leaf regularisation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub max_leaves: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// L2 penalty added to the leaf count when averaging
    pub l2_regularization: f64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            max_leaves: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            l2_regularization: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

#[derive(Debug)]
struct OpenLeaf {
    node: usize,
    rows: Vec<usize>,
    depth: usize,
    split: Option<SplitCandidate>,
}

/// Fitted regression tree
#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Fit on the subset `rows` of `x` / `y`. Rows may repeat (bootstrap).
    pub fn fit(x: &[Row], y: &[f64], rows: &[usize], params: &TreeParams) -> Self {
        let mut nodes = vec![Node::Leaf {
            value: leaf_value(y, rows, params.l2_regularization),
        }];
        if rows.is_empty() {
            return Self { nodes };
        }

        let mut open = vec![OpenLeaf {
            node: 0,
            rows: rows.to_vec(),
            depth: 0,
            split: find_split(x, y, rows, 0, params),
        }];
        let mut leaves = 1;

        while params.max_leaves.map_or(true, |max| leaves < max) {
            // First open leaf with the largest gain
            let best = open
                .iter()
                .enumerate()
                .filter_map(|(i, leaf)| leaf.split.map(|s| (i, s.gain)))
                .fold(None, |best: Option<(usize, f64)>, (i, gain)| match best {
                    Some((_, g)) if g >= gain => best,
                    _ => Some((i, gain)),
                });
            let Some((position, _)) = best else {
                break;
            };

            let leaf = open.swap_remove(position);
            let Some(split) = leaf.split else {
                break;
            };
            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = leaf
                .rows
                .iter()
                .partition(|&&r| x[r][split.feature] <= split.threshold);

            let left = nodes.len();
            nodes.push(Node::Leaf {
                value: leaf_value(y, &left_rows, params.l2_regularization),
            });
            let right = nodes.len();
            nodes.push(Node::Leaf {
                value: leaf_value(y, &right_rows, params.l2_regularization),
            });
            nodes[leaf.node] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };
            leaves += 1;

            let depth = leaf.depth + 1;
            for (node, child_rows) in [(left, left_rows), (right, right_rows)] {
                let split = find_split(x, y, &child_rows, depth, params);
                open.push(OpenLeaf {
                    node,
                    rows: child_rows,
                    depth,
                    split,
                });
            }
            // Keep selection order stable after swap_remove
            open.sort_by_key(|leaf| leaf.node);
        }

        Self { nodes }
    }

    /// Predict a single row
    pub fn predict_row(&self, row: &Row) -> f64 {
        let mut current = 0;
        loop {
            match &self.nodes[current] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    current = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }
}

fn leaf_value(y: &[f64], rows: &[usize], l2: f64) -> f64 {
    let denominator = rows.len() as f64 + l2;
    if denominator <= 0.0 {
        return 0.0;
    }
    rows.iter().map(|&r| y[r]).sum::<f64>() / denominator
}

/// Best split of `rows`, or `None` when no split is allowed or helps
fn find_split(
    x: &[Row],
    y: &[f64],
    rows: &[usize],
    depth: usize,
    params: &TreeParams,
) -> Option<SplitCandidate> {
    let n = rows.len();
    let min_leaf = params.min_samples_leaf.max(1);
    if n < params.min_samples_split.max(2) || n < 2 * min_leaf {
        return None;
    }
    if params.max_depth.map_or(false, |max| depth >= max) {
        return None;
    }

    let l2 = params.l2_regularization;
    let score = |sum: f64, count: usize| sum * sum / (count as f64 + l2);
    let total: f64 = rows.iter().map(|&r| y[r]).sum();
    let parent = score(total, n);

    let mut best: Option<SplitCandidate> = None;
    let mut sorted = rows.to_vec();
    for feature in 0..FEATURE_COUNT {
        sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]).then(a.cmp(&b)));

        let mut left_sum = 0.0;
        for i in 1..n {
            left_sum += y[sorted[i - 1]];
            let lower = x[sorted[i - 1]][feature];
            let upper = x[sorted[i]][feature];
            if i < min_leaf || n - i < min_leaf || lower == upper {
                continue;
            }

            let gain = score(left_sum, i) + score(total - left_sum, n - i) - parent;
            if gain > MIN_GAIN && best.map_or(true, |b| gain > b.gain + MIN_GAIN) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: (lower + upper) / 2.0,
                    gain,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn step_data() -> (Vec<Row>, Vec<f64>) {
        let x: Vec<Row> = (0..10).map(|i| [1.0, 2020.0, i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| if i < 5 { 0.0 } else { 1.0 }).collect();
        (x, y)
    }

    #[test]
    fn test_tree_learns_step() {
        let (x, y) = step_data();
        let rows: Vec<usize> = (0..x.len()).collect();
        let tree = RegressionTree::fit(&x, &y, &rows, &TreeParams::default());

        assert_eq!(tree.leaf_count(), 2);
        assert_relative_eq!(tree.predict_row(&[1.0, 2020.0, 2.0]), 0.0);
        assert_relative_eq!(tree.predict_row(&[1.0, 2020.0, 7.0]), 1.0);
        // Beyond the training range the last leaf is extended
        assert_relative_eq!(tree.predict_row(&[1.0, 2020.0, 42.0]), 1.0);
    }

    #[test]
    fn test_depth_and_leaf_limits() {
        let x: Vec<Row> = (0..16).map(|i| [1.0, 2020.0, i as f64]).collect();
        let y: Vec<f64> = (0..16).map(|i| (i * i) as f64).collect();
        let rows: Vec<usize> = (0..16).collect();

        let stump = RegressionTree::fit(
            &x,
            &y,
            &rows,
            &TreeParams {
                max_depth: Some(1),
                ..TreeParams::default()
            },
        );
        assert_eq!(stump.leaf_count(), 2);

        let small = RegressionTree::fit(
            &x,
            &y,
            &rows,
            &TreeParams {
                max_leaves: Some(3),
                ..TreeParams::default()
            },
        );
        assert_eq!(small.leaf_count(), 3);
    }

    #[test]
    fn test_min_samples_leaf_prevents_split() {
        let (x, y) = step_data();
        let rows: Vec<usize> = (0..x.len()).collect();
        let tree = RegressionTree::fit(
            &x,
            &y,
            &rows,
            &TreeParams {
                min_samples_leaf: 20,
                ..TreeParams::default()
            },
        );

        assert_eq!(tree.leaf_count(), 1);
        assert_relative_eq!(tree.predict_row(&x[0]), 0.5);
    }

    #[test]
    fn test_l2_shrinks_leaves() {
        let (x, y) = step_data();
        let rows: Vec<usize> = (0..x.len()).collect();
        let tree = RegressionTree::fit(
            &x,
            &y,
            &rows,
            &TreeParams {
                l2_regularization: 5.0,
                ..TreeParams::default()
            },
        );

        // 5 ones over (5 + 5)
        assert_relative_eq!(tree.predict_row(&[1.0, 2020.0, 9.0]), 0.5);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x: Vec<Row> = (0..8).map(|i| [1.0, 2020.0, i as f64]).collect();
        let y = vec![0.0; 8];
        let rows: Vec<usize> = (0..8).collect();
        let tree = RegressionTree::fit(&x, &y, &rows, &TreeParams::default());

        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.predict_row(&x[3]), 0.0);
    }
}
