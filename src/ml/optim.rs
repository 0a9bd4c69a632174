// ============================================================
// Layer 5 — Optimizer Configuration
// ============================================================
// Both optimizers clip the global gradient norm before every
// update (max_grad_norm, 5.0 in the presets); Burn applies the
// clipping inside optimizer.step(), right before the update.
//
// SGD uses PyTorch-style momentum: no dampening, no Nesterov.
// The learning rate itself is not part of the config; the
// trainer passes the scheduled rate to every step() call.

use burn::{
    grad_clipping::GradientClippingConfig,
    optim::{decay::WeightDecayConfig, momentum::MomentumConfig, AdamConfig, SgdConfig},
};

use crate::application::config::TrainConfig;

fn weight_decay(cfg: &TrainConfig) -> Option<WeightDecayConfig> {
    (cfg.weight_decay > 0.0).then(|| WeightDecayConfig::new(cfg.weight_decay as f32))
}

fn clipping(cfg: &TrainConfig) -> Option<GradientClippingConfig> {
    Some(GradientClippingConfig::Norm(cfg.max_grad_norm))
}

pub fn sgd(cfg: &TrainConfig) -> SgdConfig {
    let momentum = (cfg.momentum > 0.0).then(|| {
        MomentumConfig::new()
            .with_momentum(cfg.momentum)
            .with_dampening(0.0)
            .with_nesterov(false)
    });

    SgdConfig::new()
        .with_momentum(momentum)
        .with_weight_decay(weight_decay(cfg))
        .with_gradient_clipping(clipping(cfg))
}

pub fn adam(cfg: &TrainConfig) -> AdamConfig {
    AdamConfig::new()
        .with_epsilon(1e-8)
        .with_weight_decay(weight_decay(cfg))
        .with_grad_clipping(clipping(cfg))
}
