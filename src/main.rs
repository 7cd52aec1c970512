use tee_studio::StudioConfig;

fn main() -> anyhow::Result<()> {
    tee_studio::run(StudioConfig::default())
}
