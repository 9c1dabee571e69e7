//! Benchmarks for selection passes.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;

use sekhem::error::SelectResult;
use sekhem::pool::RulePool;
use sekhem::rule::{Condition, Rule, Term};
use sekhem::select::{ActionSelector, SelectorConfig};
use sekhem::world::{ContextEvaluator, Trigger};

struct AlwaysSatisfied;

impl ContextEvaluator for AlwaysSatisfied {
    fn evaluate(&mut self, _condition: &Condition) -> SelectResult<f32> {
        Ok(1.0)
    }
}

/// A pool mixing ground, variable, and wildcard conditions across a few
/// dozen actions, roughly the shape of a dialogue behavior set.
fn bench_pool(rules: usize) -> RulePool {
    let mut pool = RulePool::new();
    for i in 0..rules {
        let action = pool.action(&format!("act-{}", i % 20));
        let condition = match i % 3 {
            0 => Condition::pattern(vec![
                Term::Constant("topic".into()),
                Term::Constant(format!("t{i}")),
            ]),
            1 => Condition::pattern(vec![
                Term::Constant("topic".into()),
                Term::Variable("x".into()),
            ]),
            _ => Condition::wildcard(),
        };
        pool.add(
            Rule::new(format!("rule-{i}"), condition, action)
                .with_strength(0.5)
                .with_importance(1.0),
        )
        .unwrap();
    }
    pool
}

fn scoring_config() -> SelectorConfig {
    SelectorConfig {
        importance_scoring: true,
        ..Default::default()
    }
}

fn bench_triggered(c: &mut Criterion) {
    let pool = bench_pool(300);
    let trigger = Trigger::from_terms(["topic", "t0"]);
    let mut selector =
        ActionSelector::with_random(scoring_config(), rand::rngs::StdRng::seed_from_u64(0));

    c.bench_function("triggered_pass_300_rules", |bench| {
        bench.iter(|| {
            black_box(
                selector
                    .select_from_trigger(&trigger, &pool, &mut AlwaysSatisfied)
                    .unwrap(),
            )
        })
    });
}

fn bench_focus(c: &mut Criterion) {
    let pool = bench_pool(300);
    let mut selector =
        ActionSelector::with_random(scoring_config(), rand::rngs::StdRng::seed_from_u64(0));

    c.bench_function("focus_pass_300_rules", |bench| {
        bench.iter(|| {
            black_box(
                selector
                    .select_from_focus(&pool, &mut AlwaysSatisfied)
                    .unwrap(),
            )
        })
    });
}

criterion_group!(benches, bench_triggered, bench_focus);
criterion_main!(benches);
