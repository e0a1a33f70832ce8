//! Exact evaluation of a fixed strategy profile.
//!
//! These walks enumerate every chance outcome instead of sampling, so they
//! are only suitable for small games. A profile is given as a policy closure
//! mapping an information set and its action count to a distribution.
//!
//! The best-response walk moves down the public tree carrying every root
//! state that is consistent with the public history (weighted by chance and
//! opponent reach), and at the responder's decision points picks the best
//! action separately for each of its information sets.

use crate::cfr::game::{Game, GameError};

/// Player 0's expected value when both players follow `policy`.
pub fn expected_value<G, F>(game: &G, policy: &F) -> Result<f64, GameError>
where
    G: Game,
    F: Fn(&G::InfoState, usize) -> Vec<f64>,
{
    let roots = game.chance_outcomes();
    if roots.is_empty() {
        return Ok(0.0);
    }
    let chance = 1.0 / roots.len() as f64;

    let mut total = 0.0;
    for root in &roots {
        total += chance * profile_value(game, policy, root)?;
    }
    Ok(total)
}

fn profile_value<G, F>(game: &G, policy: &F, state: &G::State) -> Result<f64, GameError>
where
    G: Game,
    F: Fn(&G::InfoState, usize) -> Vec<f64>,
{
    if game.is_terminal(state) {
        return game.payoff(state, 0);
    }

    let player = game.current_player(state);
    let actions = game.legal_actions(state)?;
    let strategy = policy(&game.info_set_key(state, player), actions.len());

    let mut value = 0.0;
    for (action, &p) in actions.iter().zip(strategy.iter()) {
        let child = game.apply_action(state, action)?;
        value += p * profile_value(game, policy, &child)?;
    }
    Ok(value)
}

/// Value `responder` obtains by best-responding to the opponent's `policy`.
///
/// The result is in the responder's own frame and already averaged over
/// chance outcomes.
pub fn best_response_value<G, F>(game: &G, responder: usize, policy: &F) -> Result<f64, GameError>
where
    G: Game,
    F: Fn(&G::InfoState, usize) -> Vec<f64>,
{
    let roots = game.chance_outcomes();
    if roots.is_empty() {
        return Ok(0.0);
    }
    let chance = 1.0 / roots.len() as f64;
    let weighted: Vec<(G::State, f64)> = roots.into_iter().map(|s| (s, chance)).collect();

    respond(game, responder, policy, &weighted)
}

/// Average of both players' best-response values.
///
/// For a zero-sum game this is zero exactly at equilibrium and positive
/// everywhere else.
pub fn exploitability<G, F>(game: &G, policy: &F) -> Result<f64, GameError>
where
    G: Game,
    F: Fn(&G::InfoState, usize) -> Vec<f64>,
{
    let br0 = best_response_value(game, 0, policy)?;
    let br1 = best_response_value(game, 1, policy)?;
    Ok((br0 + br1) / 2.0)
}

/// States in `states` share one public history and differ only in private cards.
fn respond<G, F>(
    game: &G,
    responder: usize,
    policy: &F,
    states: &[(G::State, f64)],
) -> Result<f64, GameError>
where
    G: Game,
    F: Fn(&G::InfoState, usize) -> Vec<f64>,
{
    let Some((first, _)) = states.first() else {
        return Ok(0.0);
    };

    if game.is_terminal(first) {
        let mut value = 0.0;
        for (state, weight) in states {
            value += weight * game.payoff(state, responder)?;
        }
        return Ok(value);
    }

    let actor = game.current_player(first);
    let actions = game.legal_actions(first)?;

    if actor != responder {
        let strategies: Vec<Vec<f64>> = states
            .iter()
            .map(|(state, _)| policy(&game.info_set_key(state, actor), actions.len()))
            .collect();

        let mut value = 0.0;
        for (i, action) in actions.iter().enumerate() {
            let mut children = Vec::with_capacity(states.len());
            for ((state, weight), strategy) in states.iter().zip(strategies.iter()) {
                children.push((game.apply_action(state, action)?, weight * strategy[i]));
            }
            value += respond(game, responder, policy, &children)?;
        }
        return Ok(value);
    }

    // Partition by the responder's information set, keeping first-seen order.
    let mut groups: Vec<(G::InfoState, Vec<(G::State, f64)>)> = Vec::new();
    for (state, weight) in states {
        let info = game.info_set_key(state, responder);
        match groups.iter_mut().find(|(key, _)| *key == info) {
            Some((_, members)) => members.push((state.clone(), *weight)),
            None => groups.push((info, vec![(state.clone(), *weight)])),
        }
    }

    let mut value = 0.0;
    for (_, members) in &groups {
        let mut best = f64::NEG_INFINITY;
        for action in &actions {
            let mut children = Vec::with_capacity(members.len());
            for (state, weight) in members {
                children.push((game.apply_action(state, action)?, *weight));
            }
            best = best.max(respond(game, responder, policy, &children)?);
        }
        value += best;
    }
    Ok(value)
}
