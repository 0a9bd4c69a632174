// ============================================================
// Layer 5 — LeNet
// ============================================================
// The classic two-conv / three-FC network:
//
//   [N,3,S,S]
//     conv 5×5, 3→6   → relu → max-pool 2
//     conv 5×5, 6→16  → relu → max-pool 2
//     flatten                               [N, 16·s·s]
//     fc → 120 → relu
//     fc 120 → 84 → relu
//     fc 84 → num_out                       [N, num_out]
//
// where s = ((S - 4) / 2 - 4) / 2, i.e. 5 for 32×32 inputs.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::ml::model::Classifier;

#[derive(Config, Debug)]
pub struct LeNetConfig {
    pub num_out: usize,
    #[config(default = 32)]
    pub image_size: usize,
}

impl LeNetConfig {
    /// Side length of the feature map entering the first FC layer
    pub fn feature_side(&self) -> usize {
        (self.image_size.saturating_sub(4) / 2).saturating_sub(4) / 2
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> LeNet<B> {
        let side     = self.feature_side();
        let features = 16 * side * side;

        LeNet {
            conv1: Conv2dConfig::new([3, 6], [5, 5]).init(device),
            conv2: Conv2dConfig::new([6, 16], [5, 5]).init(device),
            pool:  MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            fc1:   LinearConfig::new(features, 120).init(device),
            fc2:   LinearConfig::new(120, 84).init(device),
            fc3:   LinearConfig::new(84, self.num_out).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct LeNet<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    pool:  MaxPool2d,
    fc1:   Linear<B>,
    fc2:   Linear<B>,
    fc3:   Linear<B>,
}

impl<B: Backend> Classifier<B> for LeNet<B> {
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.pool.forward(relu(self.conv1.forward(images)));
        let x = self.pool.forward(relu(self.conv2.forward(x)));
        let x = x.flatten::<2>(1, 3);

        let x = relu(self.fc1.forward(x));
        let x = relu(self.fc2.forward(x));
        self.fc3.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_feature_side() {
        assert_eq!(LeNetConfig::new(10).feature_side(), 5);
        assert_eq!(LeNetConfig::new(10).with_image_size(16).feature_side(), 1);
    }

    #[test]
    fn test_output_shape() {
        let device = Default::default();
        let model: LeNet<TestBackend> = LeNetConfig::new(10).init(&device);

        let images = Tensor::<TestBackend, 4>::zeros([2, 3, 32, 32], &device);
        assert_eq!(model.forward(images).dims(), [2, 10]);
    }

    #[test]
    fn test_smallest_supported_input() {
        let device = Default::default();
        let model: LeNet<TestBackend> = LeNetConfig::new(4).with_image_size(16).init(&device);

        let images = Tensor::<TestBackend, 4>::zeros([1, 3, 16, 16], &device);
        assert_eq!(model.forward(images).dims(), [1, 4]);
    }
}
