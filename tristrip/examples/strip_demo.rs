use tristrip::{create_strips, Config, PreprocAlgorithm, Stats};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let ids = [0, 1, 2, 2, 1, 3, 2, 3, 4];

    let config = Config::default().with_tunneling(PreprocAlgorithm::Stripify);
    let strips = create_strips(&ids, &config)?;

    for strip in &strips {
        println!("{:?}", strip.ids);
    }

    println!("{}", Stats::measure(&strips));

    Ok(())
}
