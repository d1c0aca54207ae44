//! The intent network: three fully connected layers (input → hidden →
//! hidden → classes) trained with shuffled mini-batch SGD and softmax
//! cross-entropy. Small enough to retrain from scratch in seconds.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView2;
use ndarray::Axis;
use rand::seq::SliceRandom;
use rand::Rng;

/// Step size for gradient updates.
const LEARNING_RATE: f32 = 0.1;
/// Sentences per gradient step.
const BATCH_SIZE: usize = 8;
/// How often the training loss is logged.
const LOSS_LOG_EVERY: usize = 100;

/// A fixed three-layer feed-forward network.
#[derive(Debug, Clone)]
pub struct Network {
    w1: Array2<f32>,
    b1: Array1<f32>,
    w2: Array2<f32>,
    b2: Array1<f32>,
    w3: Array2<f32>,
    b3: Array1<f32>,
}

impl Network {
    pub fn new(inputs: usize, hidden: usize, classes: usize) -> Self {
        let mut rng = rand::thread_rng();
        Network {
            w1: xavier(&mut rng, inputs, hidden),
            b1: Array1::zeros(hidden),
            w2: xavier(&mut rng, hidden, hidden),
            b2: Array1::zeros(hidden),
            w3: xavier(&mut rng, hidden, classes),
            b3: Array1::zeros(classes),
        }
    }

    /// Class probabilities for one bag-of-words vector. Sums to 1.
    pub fn forward(&self, bag: &Array1<f32>) -> Array1<f32> {
        let x = bag.view().insert_axis(Axis(0));
        let probabilities = self.forward_batch(&x);
        probabilities.index_axis(Axis(0), 0).to_owned()
    }

    /// Shuffled mini-batch SGD over the whole dataset.
    pub fn train(&mut self, x: &Array2<f32>, y: &Array2<f32>, epochs: usize) {
        let mut rng = rand::thread_rng();
        let mut order: Vec<usize> = (0..x.nrows()).collect();

        for epoch in 0..epochs {
            order.shuffle(&mut rng);

            let mut loss = 0.0;
            for batch in order.chunks(BATCH_SIZE) {
                let bx = x.select(Axis(0), batch);
                let by = y.select(Axis(0), batch);
                loss += self.step(&bx, &by);
            }

            if (epoch + 1) % LOSS_LOG_EVERY == 0 {
                let mean = loss / order.len().max(1) as f32;
                tracing::debug!("Epoch {}: mean loss {mean:.4}", epoch + 1);
            }
        }
    }

    /// One gradient step. Returns the summed cross-entropy of the batch.
    fn step(&mut self, x: &Array2<f32>, y: &Array2<f32>) -> f32 {
        let rows = x.nrows() as f32;

        let z1 = x.dot(&self.w1) + &self.b1;
        let a1 = relu(&z1);
        let z2 = a1.dot(&self.w2) + &self.b2;
        let a2 = relu(&z2);
        let p = softmax_rows(&(a2.dot(&self.w3) + &self.b3));

        let loss = -(y * &p.mapv(|v| (v + 1e-7).ln())).sum();

        let d3 = (&p - y) / rows;
        let d2 = d3.dot(&self.w3.t()) * z2.mapv(relu_gradient);
        let d1 = d2.dot(&self.w2.t()) * z1.mapv(relu_gradient);

        self.w3 -= &(a2.t().dot(&d3) * LEARNING_RATE);
        self.b3 -= &(d3.sum_axis(Axis(0)) * LEARNING_RATE);
        self.w2 -= &(a1.t().dot(&d2) * LEARNING_RATE);
        self.b2 -= &(d2.sum_axis(Axis(0)) * LEARNING_RATE);
        self.w1 -= &(x.t().dot(&d1) * LEARNING_RATE);
        self.b1 -= &(d1.sum_axis(Axis(0)) * LEARNING_RATE);

        loss
    }

    fn forward_batch(&self, x: &ArrayView2<f32>) -> Array2<f32> {
        let a1 = relu(&(x.dot(&self.w1) + &self.b1));
        let a2 = relu(&(a1.dot(&self.w2) + &self.b2));
        softmax_rows(&(a2.dot(&self.w3) + &self.b3))
    }
}

/// Uniform init scaled to the layer's fan-in and fan-out.
fn xavier(rng: &mut impl Rng, rows: usize, cols: usize) -> Array2<f32> {
    let limit = (6.0 / (rows + cols) as f32).sqrt();
    Array2::from_shape_fn((rows, cols), |_| rng.gen_range(-limit..limit))
}

fn relu(z: &Array2<f32>) -> Array2<f32> {
    z.mapv(|v| v.max(0.0))
}

fn relu_gradient(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Row-wise softmax, shifted by the row max for stability.
fn softmax_rows(z: &Array2<f32>) -> Array2<f32> {
    let mut out = z.clone();
    for mut row in out.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn probabilities_sum_to_one() {
        let network = Network::new(4, 8, 3);
        let probabilities = network.forward(&array![1.0, 0.0, 1.0, 0.0]);

        assert_eq!(probabilities.len(), 3);
        assert!((probabilities.sum() - 1.0).abs() < 1e-4);
        assert!(probabilities.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn softmax_is_stable_for_large_logits() {
        let probabilities = softmax_rows(&array![[1000.0, 1000.0]]);
        assert!((probabilities.sum() - 1.0).abs() < 1e-4);
        assert!(probabilities.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn learns_a_separable_toy_problem() {
        // Two classes over disjoint input bits.
        let x = array![
            [1.0, 0.0, 0.0, 0.0],
            [1.0, 1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0, 1.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let y = array![
            [1.0, 0.0],
            [1.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [0.0, 1.0],
            [0.0, 1.0],
        ];

        let mut network = Network::new(4, 8, 2);
        network.train(&x, &y, 2000);

        for (input, expected) in x.rows().into_iter().zip(y.rows()) {
            let probabilities = network.forward(&input.to_owned());
            let predicted = if probabilities[0] > probabilities[1] { 0 } else { 1 };
            let label = if expected[0] > expected[1] { 0 } else { 1 };
            assert_eq!(predicted, label);
            assert!(probabilities[predicted] > 0.6);
        }
    }
}
