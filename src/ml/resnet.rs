// ============================================================
// Layer 5 — Residual Networks
// ============================================================
// One ResNet implementation serves both residual presets:
//
//   ResNet     — stem 32, stages [32, 64, 128], 1 block each
//   ResNet_18  — stem 64, stages [64, 128, 256, 512], 2 blocks each
//
// Both use the small-image stem (3×3 conv, stride 1, no
// max-pool) since inputs are 32×32; the standard 7×7/stride-2
// stem would shrink the feature map to 1×1 before stage 3.
//
// Basic block:
//
//   x ─ conv3×3(stride) ─ bn ─ relu ─ conv3×3 ─ bn ─(+)─ relu
//   └──────────── shortcut (1×1 conv + bn if shape changes) ┘
//
// Each stage after the first halves the spatial size.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
        BatchNorm, BatchNormConfig, Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::ml::model::Classifier;

#[derive(Config, Debug)]
pub struct ResNetConfig {
    pub num_out:          usize,
    pub stem_channels:    usize,
    /// Output channels of each stage
    pub stage_channels:   Vec<usize>,
    /// Basic blocks per stage (same length as stage_channels)
    pub blocks_per_stage: Vec<usize>,
}

impl ResNetConfig {
    /// The "ResNet" preset: a compact three-stage network
    pub fn compact(num_out: usize) -> Self {
        Self::new(num_out, 32, vec![32, 64, 128], vec![1, 1, 1])
    }

    /// The "ResNet_18" preset
    pub fn resnet18(num_out: usize) -> Self {
        Self::new(num_out, 64, vec![64, 128, 256, 512], vec![2, 2, 2, 2])
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> ResNet<B> {
        let stem_conv = conv3x3(3, self.stem_channels, 1, device);
        let stem_bn   = BatchNormConfig::new(self.stem_channels).init(device);

        let mut blocks   = Vec::new();
        let mut channels = self.stem_channels;

        for (stage, (&out, &count)) in self
            .stage_channels
            .iter()
            .zip(&self.blocks_per_stage)
            .enumerate()
        {
            for block in 0..count {
                // Downsample at the first block of every stage but the first
                let stride = if stage > 0 && block == 0 { 2 } else { 1 };
                blocks.push(BasicBlock::new(channels, out, stride, device));
                channels = out;
            }
        }

        ResNet {
            stem_conv,
            stem_bn,
            blocks,
            pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            head: LinearConfig::new(channels, self.num_out).init(device),
        }
    }
}

fn conv3x3<B: Backend>(in_ch: usize, out_ch: usize, stride: usize, device: &B::Device) -> Conv2d<B> {
    Conv2dConfig::new([in_ch, out_ch], [3, 3])
        .with_stride([stride, stride])
        .with_padding(PaddingConfig2d::Explicit(1, 1))
        .with_bias(false)
        .init(device)
}

// ─── Shortcut projection ──────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Downsample<B: Backend> {
    conv: Conv2d<B>,
    bn:   BatchNorm<B, 2>,
}

impl<B: Backend> Downsample<B> {
    fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.bn.forward(self.conv.forward(x))
    }
}

// ─── Basic block ──────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct BasicBlock<B: Backend> {
    conv1:      Conv2d<B>,
    bn1:        BatchNorm<B, 2>,
    conv2:      Conv2d<B>,
    bn2:        BatchNorm<B, 2>,
    downsample: Option<Downsample<B>>,
}

impl<B: Backend> BasicBlock<B> {
    fn new(in_ch: usize, out_ch: usize, stride: usize, device: &B::Device) -> Self {
        let downsample = (stride != 1 || in_ch != out_ch).then(|| Downsample {
            conv: Conv2dConfig::new([in_ch, out_ch], [1, 1])
                .with_stride([stride, stride])
                .with_bias(false)
                .init(device),
            bn: BatchNormConfig::new(out_ch).init(device),
        });

        Self {
            conv1: conv3x3(in_ch, out_ch, stride, device),
            bn1:   BatchNormConfig::new(out_ch).init(device),
            conv2: conv3x3(out_ch, out_ch, 1, device),
            bn2:   BatchNormConfig::new(out_ch).init(device),
            downsample,
        }
    }

    fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let identity = match &self.downsample {
            Some(ds) => ds.forward(x.clone()),
            None     => x.clone(),
        };

        let out = relu(self.bn1.forward(self.conv1.forward(x)));
        let out = self.bn2.forward(self.conv2.forward(out));
        relu(out + identity)
    }
}

// ─── Network ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct ResNet<B: Backend> {
    stem_conv: Conv2d<B>,
    stem_bn:   BatchNorm<B, 2>,
    blocks:    Vec<BasicBlock<B>>,
    pool:      AdaptiveAvgPool2d,
    head:      Linear<B>,
}

impl<B: Backend> ResNet<B> {
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }
}

impl<B: Backend> Classifier<B> for ResNet<B> {
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = relu(self.stem_bn.forward(self.stem_conv.forward(images)));
        for block in &self.blocks {
            x = block.forward(x);
        }
        let x = self.pool.forward(x); // [batch, channels, 1, 1]
        self.head.forward(x.flatten::<2>(1, 3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_compact_output_shape() {
        let device = Default::default();
        let model: ResNet<TestBackend> = ResNetConfig::compact(10).init(&device);
        assert_eq!(model.num_blocks(), 3);

        let images = Tensor::<TestBackend, 4>::zeros([2, 3, 32, 32], &device);
        assert_eq!(model.forward(images).dims(), [2, 10]);
    }

    #[test]
    fn test_resnet18_has_eight_blocks() {
        let device = Default::default();
        let model: ResNet<TestBackend> = ResNetConfig::resnet18(10).init(&device);
        assert_eq!(model.num_blocks(), 8);

        let images = Tensor::<TestBackend, 4>::zeros([1, 3, 16, 16], &device);
        assert_eq!(model.forward(images).dims(), [1, 10]);
    }
}
