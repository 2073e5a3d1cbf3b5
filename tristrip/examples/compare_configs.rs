use tristrip::{create_strips, Config, PreprocAlgorithm, Stats};
use tristrip_test_utils::grid_ids;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let ids = grid_ids(16, 16);

    let configs = [
        ("stripify", Config::default()),
        (
            "tunneling (isolated)",
            Config::default()
                .with_tunneling(PreprocAlgorithm::Isolated)
                .with_max_count(64),
        ),
        (
            "tunneling (pairs)",
            Config::default()
                .with_tunneling(PreprocAlgorithm::Pairs)
                .with_max_count(64),
        ),
        (
            "tunneling (stripify)",
            Config::default()
                .with_tunneling(PreprocAlgorithm::Stripify)
                .with_max_count(64)
                .with_loop_limit(10_000, true),
        ),
    ];

    for (name, config) in configs {
        let strips = create_strips(&ids, &config)?;

        println!("{name}: {}", Stats::measure(&strips));
    }

    Ok(())
}
