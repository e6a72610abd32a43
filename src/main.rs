fn main() -> anyhow::Result<()> {
    orbit_cubes::flow::run()
}
