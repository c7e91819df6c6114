use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Target {
    #[arg(help = "Compute the target for <DIFFICULTY>.")]
    difficulty: Difficulty,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub difficulty: u64,
    pub target: String,
    pub raw: u32,
    pub numeric: u32,
}

impl Target {
    pub(crate) fn run(self) -> Result {
        println!("{}", serde_json::to_string_pretty(&self.output())?);
        Ok(())
    }

    fn output(&self) -> Output {
        let target = self.difficulty.target();

        Output {
            difficulty: self.difficulty.get(),
            target: target.to_string(),
            raw: target.raw(),
            numeric: target.numeric(),
        }
    }
}
