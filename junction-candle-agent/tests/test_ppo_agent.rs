mod common;

use anyhow::Result;
use candle_core::{Device, Tensor};
use common::{run, Chain, DiscreteAct, VecObs, CHAIN_LEN};
use junction_candle_agent::ppo::{ActorCriticConfig, Ppo, PpoConfig, PpoError};
use junction_core::{Agent, Configurable, Env, OptInterval, Policy, Step};
use tempdir::TempDir;

const OPT_INTERVAL: usize = 16;

fn config(seed: u64) -> PpoConfig {
    let model_config = ActorCriticConfig::default()
        .obs_dim(CHAIN_LEN)
        .n_actions(2)
        .trunk_units(vec![32])
        .head_units(vec![32]);
    PpoConfig::default()
        .model_config(model_config)
        .learning_rate(1e-3)
        .gamma(0.9)
        .n_epochs(3)
        .opt_interval(OptInterval::Steps(OPT_INTERVAL))
        .seed(seed)
}

fn all_states() -> Result<Tensor> {
    let mut v = vec![0f32; CHAIN_LEN * CHAIN_LEN];
    for i in 0..CHAIN_LEN {
        v[i * CHAIN_LEN + i] = 1.0;
    }
    Ok(Tensor::from_vec(v, (CHAIN_LEN, CHAIN_LEN), &Device::Cpu)?)
}

fn outputs(agent: &Ppo<Chain>) -> Result<(Vec<Vec<f32>>, Vec<f32>)> {
    let (logits, values) = agent.optimizer().model().evaluate(&all_states()?)?;
    Ok((logits.to_vec2::<f32>()?, values.to_vec1::<f32>()?))
}

#[test]
fn test_train_records() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut env = Chain::build(&(), 0)?;
    let mut agent: Ppo<Chain> = Ppo::build(config(0))?;
    agent.train();
    assert!(agent.is_train());

    let records = run(&mut env, &mut agent, 5 * OPT_INTERVAL)?;
    assert_eq!(records.len(), 5);
    for record in records.iter() {
        assert_eq!(record.get_scalar("n_transitions")?, OPT_INTERVAL as f32);
        for key in ["loss_actor", "loss_critic", "loss", "ratio_mean", "clip_fraction"] {
            assert!(record.get_scalar(key)?.is_finite(), "{}", key);
        }
    }
    assert_eq!(records[4].get_scalar("n_opts")?, 5.0);
    assert!(agent.optimizer().buffer().is_empty());
    Ok(())
}

#[test]
fn test_sampling_is_reproducible() -> Result<()> {
    let mut agent1: Ppo<Chain> = Ppo::build(config(7))?;
    let mut agent2: Ppo<Chain> = Ppo::build(config(7))?;
    agent1.train();
    agent2.train();

    // Same weights, same seed, same actions
    let dir = TempDir::new("ppo_seed")?;
    agent1.save_params(dir.path())?;
    agent2.load_params(dir.path())?;

    let obs = VecObs(vec![1.0, 0.0, 0.0, 0.0]);
    for _ in 0..20 {
        assert_eq!(agent1.sample(&obs)?, agent2.sample(&obs)?);
    }
    Ok(())
}

#[test]
fn test_train_step_without_sample() -> Result<()> {
    let mut agent: Ppo<Chain> = Ppo::build(config(0))?;
    let step = Step::<Chain>::new(VecObs(vec![0.0; CHAIN_LEN]), DiscreteAct(1), 0.0, false, false, ());

    // Training mode, but nothing sampled yet
    agent.train();
    let err = agent.train_step(&step).unwrap_err();
    assert_eq!(err.downcast_ref::<PpoError>(), Some(&PpoError::NoPendingAction));

    // Evaluation mode does not retain the action
    agent.eval();
    agent.sample(&VecObs(vec![1.0, 0.0, 0.0, 0.0]))?;
    assert!(agent.train_step(&step).is_err());

    // reset() drops the pending action
    agent.train();
    agent.sample(&VecObs(vec![1.0, 0.0, 0.0, 0.0]))?;
    agent.reset();
    assert!(agent.train_step(&step).is_err());
    assert!(agent.optimizer().buffer().is_empty());
    Ok(())
}

#[test]
fn test_save_and_load() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut env = Chain::build(&(), 0)?;
    let mut agent: Ppo<Chain> = Ppo::build(config(1))?;
    agent.train();
    run(&mut env, &mut agent, 2 * OPT_INTERVAL)?;

    let dir = TempDir::new("ppo")?;
    let path = dir.path().join("agent");
    agent.save_params(&path)?;
    assert!(path.join("ppo.yaml").is_file());
    assert!(path.join("actor_critic.safetensors").is_file());

    // Weights restored into a freshly built agent
    let mut agent2: Ppo<Chain> = Ppo::build(config(1))?;
    assert_ne!(outputs(&agent)?, outputs(&agent2)?);
    agent2.load_params(&path)?;
    assert_eq!(outputs(&agent)?, outputs(&agent2)?);

    // Hyperparameters and weights restored from the directory alone
    let agent3: Ppo<Chain> = Ppo::build_from_dir(&path)?;
    assert_eq!(agent3.config(), agent.config());
    assert_eq!(agent3.config().n_epochs, 3);
    assert_eq!(agent3.config().gamma, 0.9);
    assert_eq!(agent3.config().model_config.opt_config.lr(), 1e-3);
    assert_eq!(outputs(&agent)?, outputs(&agent3)?);
    Ok(())
}

#[test]
fn test_invalid_config() {
    assert!(Ppo::<Chain>::build(config(0).clip(0.0)).is_err());
    assert!(Ppo::<Chain>::build(config(0).n_epochs(0)).is_err());
    assert!(Ppo::<Chain>::build(config(0).opt_interval(OptInterval::Episodes(0))).is_err());
}
