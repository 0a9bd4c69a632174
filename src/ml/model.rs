use burn::prelude::*;

/// Anything that maps a batch of images to class logits.
///
/// images: [batch, 3, height, width] → logits: [batch, num_out]
pub trait Classifier<B: Backend>: Module<B> {
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2>;
}

/// Predicted class per row: argmax over the logits, flattened to [batch]
pub fn predictions<B: Backend>(logits: Tensor<B, 2>) -> Tensor<B, 1, Int> {
    // argmax(1) keeps the reduced dim: [batch, 1]
    logits.argmax(1).flatten::<1>(0, 1)
}

/// How many predictions match the targets
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    let correct: i64 = predictions(logits)
        .equal(targets)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>();
    correct as usize
}
