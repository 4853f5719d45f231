use rand_distr::{Distribution, Normal, Uniform};
use rand_pcg::Pcg64Mcg;
use serde::Deserialize;

#[derive(Debug, Clone, Copy)]
pub enum DistType {
    Uniform(Uniform<f64>),
    Normal(Normal<f64>),
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Deserialize)]
pub struct DistParams {
    pub dist_name: String,
    pub seed: Option<u64>,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl DistType {
    pub fn new(params: &DistParams) -> Self {
        match params.dist_name.to_lowercase().as_str() {
            "uniform" => match Self::build_uniform(params) {
                Ok(dist) => dist,
                Err(_) => panic!("Invalid distribution parameters"),
            },
            "normal" => match Self::build_normal(params) {
                Ok(dist) => dist,
                Err(_) => panic!("Invalid distribution parameters"),
            },
            _ => panic!("Invalid distribution name. Supported values are: uniform, normal"),
        }
    }

    fn build_uniform(dist_params: &DistParams) -> Result<Self, Box<dyn std::error::Error>> {
        let min = dist_params.min.ok_or("Missing min")?;
        let max = dist_params.max.ok_or("Missing max")?;
        Ok(Self::Uniform(Uniform::new(min, max)))
    }

    fn build_normal(dist_params: &DistParams) -> Result<Self, Box<dyn std::error::Error>> {
        let mean = dist_params.mean.ok_or("Missing mean")?;
        let std_dev = dist_params.std_dev.ok_or("Missing std_dev")?;
        Ok(Self::Normal(Normal::new(mean, std_dev)?))
    }
}

/// Seeded sampler so a run is reproducible for a given configuration.
#[derive(Debug, Clone)]
pub struct RngSampler {
    pub dist: DistType,
    pub rng: Pcg64Mcg,
}

impl RngSampler {
    pub fn new(params: &DistParams) -> Self {
        let seed: u128 = params.seed.unwrap_or(0) as u128;
        let dist = DistType::new(params);
        Self {
            dist,
            rng: Pcg64Mcg::new(seed),
        }
    }

    pub fn sample(&mut self) -> f64 {
        match self.dist {
            DistType::Uniform(ref dist) => dist.sample(&mut self.rng),
            DistType::Normal(ref dist) => dist.sample(&mut self.rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal_params(seed: u64) -> DistParams {
        DistParams {
            dist_name: "normal".to_string(),
            seed: Some(seed),
            mean: Some(0.0),
            std_dev: Some(1.0),
            min: None,
            max: None,
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut sampler_a = RngSampler::new(&normal_params(42));
        let mut sampler_b = RngSampler::new(&normal_params(42));
        for _ in 0..10 {
            assert_eq!(sampler_a.sample(), sampler_b.sample());
        }
    }

    #[test]
    #[should_panic]
    fn test_unknown_distribution_panics() {
        RngSampler::new(&DistParams {
            dist_name: "weibull".to_string(),
            seed: None,
            mean: None,
            std_dev: None,
            min: None,
            max: None,
        });
    }
}
