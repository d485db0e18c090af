use anyhow::{bail, Result};

/// Zero-mean / unit-variance scaling, statistics taken from the rows it is fit on.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub var: Vec<f64>, // population variance
    pub scale: Vec<f64>,
    pub n_samples: usize,
}

impl StandardScaler {
    pub fn fit<const N: usize>(rows: &[[f64; N]]) -> Result<Self> {
        if rows.is_empty() {
            bail!("cannot fit scaler on zero rows");
        }
        let n = rows.len() as f64;

        let mut mean = vec![0.0; N];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0; N];
        for row in rows {
            for ((acc, v), m) in var.iter_mut().zip(row).zip(&mean) {
                *acc += (v - m).powi(2);
            }
        }
        var.iter_mut().for_each(|v| *v /= n);

        // constant columns pass through centred but unscaled
        let scale = var
            .iter()
            .map(|v| {
                let s = v.sqrt();
                if s > 0.0 && s.is_finite() { s } else { 1.0 }
            })
            .collect();

        Ok(Self { mean, var, scale, n_samples: rows.len() })
    }

    pub fn transform<const N: usize>(&self, rows: &[[f64; N]]) -> Vec<[f64; N]> {
        rows.iter()
            .map(|row| {
                let mut out = [0.0; N];
                for (j, o) in out.iter_mut().enumerate() {
                    *o = (row[j] - self.mean[j]) / self.scale[j];
                }
                out
            })
            .collect()
    }
}
