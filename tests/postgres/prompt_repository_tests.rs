//! Prompt CRUD against `PostgreSQL`.

use super::helpers::{BoxError, PreparedRepos, clock, prepared_repos};
use geoscope::prompt::{
    domain::{Prompt, PromptCategory, PromptContent},
    ports::{PromptRepository, PromptRepositoryError},
};
use mockable::DefaultClock;
use rstest::rstest;

fn new_prompt(content: &str, clock: &DefaultClock) -> Result<Prompt, BoxError> {
    Ok(Prompt::new(
        PromptContent::new(content)?,
        PromptCategory::new("retail")?,
        clock,
    ))
}

#[rstest]
#[ignore = "needs PostgreSQL: starts an embedded cluster unless GEOSCOPE_TEST_DATABASE_URL is set"]
#[tokio::test(flavor = "multi_thread")]
async fn prompts_round_trip_and_list_oldest_first(
    #[future] prepared_repos: Result<PreparedRepos, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let repos = prepared_repos.await?;
    let first = new_prompt("Which laptop brands are reliable?", &clock)?;
    let second = new_prompt("Which phone brands are reliable?", &clock)?;
    repos.prompts.store(&first).await?;
    repos.prompts.store(&second).await?;

    let found = repos
        .prompts
        .find_by_id(first.id())
        .await?
        .ok_or("stored prompt missing")?;
    let listed: Vec<_> = repos
        .prompts
        .list_all()
        .await?
        .iter()
        .map(Prompt::id)
        .collect();

    assert_eq!(found.content().as_str(), "Which laptop brands are reliable?");
    assert_eq!(found.category().as_str(), "retail");
    assert_eq!(listed, vec![first.id(), second.id()]);
    Ok(())
}

#[rstest]
#[ignore = "needs PostgreSQL: starts an embedded cluster unless GEOSCOPE_TEST_DATABASE_URL is set"]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_prompt_id_is_rejected(
    #[future] prepared_repos: Result<PreparedRepos, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let repos = prepared_repos.await?;
    let prompt = new_prompt("Duplicate me", &clock)?;
    repos.prompts.store(&prompt).await?;

    let result = repos.prompts.store(&prompt).await;

    assert!(matches!(result, Err(PromptRepositoryError::DuplicatePrompt(id)) if id == prompt.id()));
    Ok(())
}

#[rstest]
#[ignore = "needs PostgreSQL: starts an embedded cluster unless GEOSCOPE_TEST_DATABASE_URL is set"]
#[tokio::test(flavor = "multi_thread")]
async fn update_and_delete_require_an_existing_prompt(
    #[future] prepared_repos: Result<PreparedRepos, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let repos = prepared_repos.await?;
    let mut prompt = new_prompt("Before edit", &clock)?;
    repos.prompts.store(&prompt).await?;
    prompt.edit(Some(PromptContent::new("After edit")?), None, &clock);
    repos.prompts.update(&prompt).await?;

    let edited = repos
        .prompts
        .find_by_id(prompt.id())
        .await?
        .ok_or("edited prompt missing")?;
    repos.prompts.delete(prompt.id()).await?;
    let second_delete = repos.prompts.delete(prompt.id()).await;
    let missing_update = repos.prompts.update(&prompt).await;

    assert_eq!(edited.content().as_str(), "After edit");
    assert!(repos.prompts.find_by_id(prompt.id()).await?.is_none());
    assert!(matches!(second_delete, Err(PromptRepositoryError::NotFound(_))));
    assert!(matches!(missing_update, Err(PromptRepositoryError::NotFound(_))));
    Ok(())
}
