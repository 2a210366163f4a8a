//! actionloop command implementations

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use actionloop_agent::actions::workspace_actions;
use actionloop_agent::bsm::BsmExecutor;
use actionloop_agent::{AgentContext, AgentLooper, AgentOptions, PromptTemplate};
use actionloop_bus::{EventBus, EventDispatcher};
use actionloop_cache::{FileCache, PromptCache};
use actionloop_config::{self, Config};
use actionloop_provider::OpenAiProvider;

const RUN_TEMPLATE: &str = "You are an autonomous agent working inside a workspace directory.

Your task is the following:
# BEGIN TASK
{task}
# END TASK

You can use the following actions. Answer only with actions, one per line:
{instructions}

Here are the actions you already took and their feedback:
{feedback_steps}

When the task is complete, use the done action.
";

pub struct RunArgs {
    pub task: String,
    pub tries: Option<u32>,
    pub max_steps: Option<usize>,
    pub no_cache: bool,
}

pub struct BsmArgs {
    pub question: String,
    pub answers: usize,
    pub criteria: usize,
    pub criterion_names: Vec<String>,
    pub no_cache: bool,
}

/// Agent context built from the config, plus the task logging its events
async fn agent_context(
    config: &Config,
    options: AgentOptions,
    no_cache: bool,
) -> Result<(AgentContext, JoinHandle<usize>)> {
    let api_key = config.api_key().context(
        "No API key configured. Set provider.api_key in ~/.actionloop/config.json",
    )?;
    let provider = OpenAiProvider::new(api_key, config.api_base(), Some(config.default_model()));

    let cache = if config.cache.enabled && !no_cache {
        let root = config.cache_path();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Cannot create cache directory {}", root.display()))?;
        debug!("prompt cache at {}", root.display());
        PromptCache::new(Arc::new(FileCache::new(root)))
    } else {
        PromptCache::disabled()
    };

    let (events, receiver) = EventBus::channel();
    let mut dispatcher = EventDispatcher::new(receiver);
    dispatcher.on_prompt(|event| {
        debug!("→ {} [{}] {}", event.agent, event.model, event.key);
        trace!("{}", event.prompt);
    });
    dispatcher.on_answer(|event| {
        debug!("← {} {}", event.agent, event.key);
        trace!("{}", event.answer);
    });
    let dispatcher_task = tokio::spawn(dispatcher.run());

    let context = AgentContext::new(Arc::new(provider))
        .with_cache(cache)
        .with_events(events)
        .with_options(options);

    Ok((context, dispatcher_task))
}

/// Wait for the event dispatcher once every agent is gone
async fn finish_events(dispatcher_task: JoinHandle<usize>) {
    match dispatcher_task.await {
        Ok(count) => debug!("{} completion calls observed", count / 2),
        Err(e) => debug!("event dispatcher stopped: {}", e),
    }
}

/// Initialize config, workspace and cache
pub async fn init_command() -> Result<()> {
    println!("◆ Initializing actionloop...");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = actionloop_config::init()
        .await
        .context("Cannot initialize configuration")?;

    println!("Config:    {}", actionloop_config::config_path().display());
    println!("Workspace: {}", config.workspace_path().display());
    if config.cache.enabled {
        println!("Cache:     {}", config.cache_path().display());
    }

    println!("\n◆ actionloop initialized");
    println!("\nNext steps:");
    println!("  1. Add your API key to ~/.actionloop/config.json");
    println!("  2. Run a task: actionloop run -t \"Create a hello.txt file\"");

    Ok(())
}

/// Show status
pub async fn status_command() -> Result<()> {
    let config_path = actionloop_config::config_path();
    let config = Config::load()
        .await
        .with_context(|| format!("Cannot load {}", config_path.display()))?;
    let workspace = config.workspace_path();
    let cache = config.cache_path();

    println!("◆ actionloop Status");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("Config:    {} {}", config_path.display(), presence(config_path.exists()));
    println!("Workspace: {} {}", workspace.display(), presence(workspace.exists()));
    if config.cache.enabled {
        println!("Cache:     {} {}", cache.display(), presence(cache.exists()));
    } else {
        println!("Cache:     [Disabled]");
    }

    println!("Model:     {}", config.default_model());
    println!(
        "API Key:   {}",
        if config.has_api_key() {
            "[Set]"
        } else {
            "[Missing]"
        }
    );
    println!("Tries:     {}", config.agent.tries);
    println!("Max steps: {}", config.agent.max_steps);

    println!("\n◆ Ready");

    Ok(())
}

fn presence(exists: bool) -> &'static str {
    if exists {
        "[OK]"
    } else {
        "[Missing]"
    }
}

/// Run the looping agent with the built-in workspace actions
pub async fn run_command(args: RunArgs) -> Result<()> {
    let config = Config::load().await.context("Cannot load configuration")?;

    let workspace = config.workspace_path();
    tokio::fs::create_dir_all(&workspace)
        .await
        .with_context(|| format!("Cannot create workspace {}", workspace.display()))?;

    let mut options = AgentOptions::from_config(&config);
    if let Some(tries) = args.tries {
        options = options.with_tries(tries);
    }
    if let Some(max_steps) = args.max_steps {
        options = options.with_max_steps(Some(max_steps));
    }

    let (context, dispatcher_task) = agent_context(&config, options, args.no_cache).await?;

    println!("◆ Running task in {}", workspace.display());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let template = PromptTemplate::new(RUN_TEMPLATE).with_variable("task", args.task);
    let mut agent = AgentLooper::new(
        "task-agent",
        context,
        template,
        workspace_actions(&workspace),
    )?;

    let result = agent.run().await;
    let (steps, actions, errors) = (
        agent.state().step,
        agent.actions_count(),
        agent.actions_error_count(),
    );
    drop(agent);
    finish_events(dispatcher_task).await;

    result.context("Task failed")?;

    info!("task done after {} steps", steps);
    println!(
        "\n◆ Task done in {} steps ({} actions, {} errors)",
        steps, actions, errors
    );

    Ok(())
}

/// Answer a question with branch-solve-merge
pub async fn bsm_command(args: BsmArgs) -> Result<()> {
    let config = Config::load().await.context("Cannot load configuration")?;
    let options = AgentOptions::from_config(&config);
    let (context, dispatcher_task) = agent_context(&config, options, args.no_cache).await?;

    println!("◆ Branch-solve-merge");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let executor = BsmExecutor::new(context, args.question)
        .with_answer_count(args.answers)
        .with_criteria_count(args.criteria)
        .with_criteria(args.criterion_names);

    let result = executor.execute().await;
    drop(executor);
    finish_events(dispatcher_task).await;

    let outcome = result.context("Branch-solve-merge failed")?;

    println!("\nCriteria:");
    for criterion in &outcome.criteria {
        println!("  - {}: {}", criterion.name, criterion.definition);
    }

    println!("\nNotes:");
    for (index, note) in &outcome.notes {
        println!("  Answer {}: {}", index, note);
    }

    println!("\n◆ Best answer ({})", outcome.best_answer_index);
    println!("{}", outcome.best_answer);
    println!("\n◆ Merged answer");
    println!("{}", outcome.merged_answer);

    Ok(())
}

/// Remove every cached prompt and answer
pub async fn cache_clear_command() -> Result<()> {
    let config = Config::load().await.context("Cannot load configuration")?;
    let root = config.cache_path();

    let removed = FileCache::new(&root)
        .clear()
        .await
        .with_context(|| format!("Cannot clear cache at {}", root.display()))?;

    println!("✓ Removed {} cached entries from {}", removed, root.display());
    Ok(())
}
