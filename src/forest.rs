use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64_with_seed;

#[derive(Debug, Clone)]
pub struct ForestParams {
    pub n_trees: usize,
    pub seed: u64,
    /// Features tried per split; `None` = floor(sqrt(n_features)).
    pub max_features: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            max_features: None,
            min_samples_split: 2,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf { p1: f64 },
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn p1<const N: usize>(&self, row: &[f64; N]) -> f64 {
        let mut at = 0;
        loop {
            match &self.nodes[at] {
                Node::Leaf { p1 } => return *p1,
                Node::Split { feature, threshold, left, right } => {
                    at = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Bagged ensemble of fully grown Gini trees for a 0/1 target.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<Tree>,
    importances: Vec<f64>,
}

impl RandomForest {
    pub fn fit<const N: usize>(x: &[[f64; N]], y: &[u8], params: &ForestParams) -> Result<Self> {
        if x.is_empty() || x.len() != y.len() {
            bail!("forest needs matching, non-empty x/y (got {} rows, {} labels)", x.len(), y.len());
        }
        if params.n_trees == 0 {
            bail!("forest needs at least one tree");
        }
        let max_features = params
            .max_features
            .unwrap_or_else(|| (N as f64).sqrt().floor() as usize)
            .clamp(1, N.max(1));

        let mut trees = Vec::with_capacity(params.n_trees);
        let mut importances = vec![0.0; N];

        for t in 0..params.n_trees {
            let tree_seed = xxh3_64_with_seed(&(t as u64).to_le_bytes(), params.seed);
            let mut rng = StdRng::seed_from_u64(tree_seed);

            let n = x.len();
            let mut sample: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();

            let mut builder = TreeBuilder {
                x,
                y,
                nodes: Vec::new(),
                importances: [0.0; N],
                max_features,
                min_samples_split: params.min_samples_split.max(2),
                total: n as f64,
                rng,
            };
            builder.grow(&mut sample);

            let tree_total: f64 = builder.importances.iter().sum();
            if tree_total > 0.0 {
                for (acc, imp) in importances.iter_mut().zip(builder.importances.iter()) {
                    *acc += imp / tree_total;
                }
            }
            trees.push(Tree { nodes: builder.nodes });
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        debug!(
            "Forest trained - trees={}, rows={}, max_features={}, avg_nodes={:.1}",
            trees.len(),
            x.len(),
            max_features,
            trees.iter().map(|t| t.nodes.len()).sum::<usize>() as f64 / trees.len() as f64
        );
        Ok(Self { trees, importances })
    }

    /// Mean P(viral) over the trees.
    pub fn predict_proba<const N: usize>(&self, row: &[f64; N]) -> f64 {
        self.trees.iter().map(|t| t.p1(row)).sum::<f64>() / self.trees.len() as f64
    }

    pub fn predict<const N: usize>(&self, rows: &[[f64; N]]) -> Vec<u8> {
        rows.iter().map(|r| u8::from(self.predict_proba(r) > 0.5)).collect()
    }

    /// Mean decrease in impurity per feature, summing to 1 (all zeros if no
    /// tree ever split).
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }
}

fn gini(pos: f64, n: f64) -> f64 {
    if n == 0.0 {
        return 0.0;
    }
    let p = pos / n;
    2.0 * p * (1.0 - p)
}

struct TreeBuilder<'a, const N: usize> {
    x: &'a [[f64; N]],
    y: &'a [u8],
    nodes: Vec<Node>,
    importances: [f64; N],
    max_features: usize,
    min_samples_split: usize,
    total: f64,
    rng: StdRng,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    child_impurity: f64,
}

impl<const N: usize> TreeBuilder<'_, N> {
    fn grow(&mut self, idx: &mut [usize]) -> usize {
        let n = idx.len();
        let pos = idx.iter().filter(|&&i| self.y[i] == 1).count();
        let p1 = pos as f64 / n as f64;

        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { p1 });

        if n < self.min_samples_split || pos == 0 || pos == n {
            return id;
        }

        let Some(best) = self.best_split(idx, pos) else {
            return id;
        };

        let parent = gini(pos as f64, n as f64);
        self.importances[best.feature] += (n as f64 / self.total) * (parent - best.child_impurity);

        let f = best.feature;
        idx.sort_by(|&a, &b| self.x[a][f].total_cmp(&self.x[b][f]));
        let mid = idx.partition_point(|&i| self.x[i][f] <= best.threshold);
        let (l, r) = idx.split_at_mut(mid);
        let left = self.grow(l);
        let right = self.grow(r);

        self.nodes[id] = Node::Split { feature: f, threshold: best.threshold, left, right };
        id
    }

    // Tries `max_features` random features, then keeps drawing until at least
    // one usable split exists or the features run out.
    fn best_split(&mut self, idx: &mut [usize], pos: usize) -> Option<BestSplit> {
        let n = idx.len();
        let mut features: Vec<usize> = (0..N).collect();
        features.shuffle(&mut self.rng);

        let mut best: Option<BestSplit> = None;
        for (k, &f) in features.iter().enumerate() {
            if k >= self.max_features && best.is_some() {
                break;
            }
            idx.sort_by(|&a, &b| self.x[a][f].total_cmp(&self.x[b][f]));

            let mut left_pos = 0usize;
            for j in 0..n - 1 {
                if self.y[idx[j]] == 1 {
                    left_pos += 1;
                }
                let lo = self.x[idx[j]][f];
                let hi = self.x[idx[j + 1]][f];
                if lo >= hi {
                    continue;
                }
                let left_n = (j + 1) as f64;
                let right_n = (n - j - 1) as f64;
                let child = (left_n / n as f64) * gini(left_pos as f64, left_n)
                    + (right_n / n as f64) * gini((pos - left_pos) as f64, right_n);

                if best.as_ref().map_or(true, |b| child < b.child_impurity) {
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi || !threshold.is_finite() {
                        threshold = lo;
                    }
                    best = Some(BestSplit { feature: f, threshold, child_impurity: child });
                }
            }
        }
        best
    }
}
