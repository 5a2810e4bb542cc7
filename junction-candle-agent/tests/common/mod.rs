//! Toy environments for the agent tests.
#![allow(dead_code)]
use anyhow::Result;
use junction_core::{record::Record, Act, Agent, Env, Obs, Step};

#[derive(Clone, Debug, PartialEq)]
pub struct VecObs(pub Vec<f32>);

impl Obs for VecObs {}

impl From<VecObs> for Vec<f32> {
    fn from(obs: VecObs) -> Self {
        obs.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DiscreteAct(pub u32);

impl Act for DiscreteAct {}

impl From<u32> for DiscreteAct {
    fn from(a: u32) -> Self {
        Self(a)
    }
}

/// One-step episodes with a constant observation. Action 1 pays 1, action 0 pays 0.
pub struct Bandit;

impl Bandit {
    pub const OBS: [f32; 2] = [1.0, 0.0];
}

impl Env for Bandit {
    type Config = ();
    type Obs = VecObs;
    type Act = DiscreteAct;
    type Info = ();

    fn build(_config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self)
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        let reward = if a.0 == 1 { 1.0 } else { 0.0 };
        let step = Step::new(VecObs(Self::OBS.to_vec()), a.clone(), reward, true, false, ());
        Ok((step, Record::empty()))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        Ok(VecObs(Self::OBS.to_vec()))
    }
}

/// Corridor of `CHAIN_LEN` cells observed as a one-hot vector.
///
/// Action 1 moves right, action 0 moves left. Reaching the last cell pays 1
/// and terminates the episode; episodes are truncated after `MAX_STEPS` steps.
pub struct Chain {
    pos: usize,
    t: usize,
}

pub const CHAIN_LEN: usize = 4;
pub const MAX_STEPS: usize = 10;

impl Chain {
    fn obs(&self) -> VecObs {
        let mut v = vec![0f32; CHAIN_LEN];
        v[self.pos] = 1.0;
        VecObs(v)
    }
}

impl Env for Chain {
    type Config = ();
    type Obs = VecObs;
    type Act = DiscreteAct;
    type Info = ();

    fn build(_config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self { pos: 0, t: 0 })
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        self.t += 1;
        self.pos = match a.0 {
            0 => self.pos.saturating_sub(1),
            _ => (self.pos + 1).min(CHAIN_LEN - 1),
        };
        let is_terminated = self.pos == CHAIN_LEN - 1;
        let is_truncated = !is_terminated && self.t >= MAX_STEPS;
        let reward = if is_terminated { 1.0 } else { 0.0 };
        let step = Step::new(self.obs(), a.clone(), reward, is_terminated, is_truncated, ());
        Ok((step, Record::from_scalar("pos", self.pos as f32)))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.pos = 0;
        self.t = 0;
        Ok(self.obs())
    }
}

/// Runs `n_steps` interaction steps and returns the records of the updates.
pub fn run<E: Env>(env: &mut E, agent: &mut dyn Agent<E>, n_steps: usize) -> Result<Vec<Record>> {
    let mut records = vec![];
    let mut obs = env.reset()?;
    agent.reset();

    for _ in 0..n_steps {
        let act = agent.sample(&obs)?;
        let (step, _) = env.step(&act)?;
        if let Some(record) = agent.train_step(&step)? {
            records.push(record);
        }
        obs = if step.is_done() {
            agent.reset();
            env.reset()?
        } else {
            step.obs
        };
    }

    Ok(records)
}
