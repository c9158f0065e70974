use leptos::prelude::*;

use super::board::GameStatus;
use crate::engine::GameResult;

fn steps_label(status: &GameStatus) -> String {
	match status.max_steps {
		Some(budget) => format!("Steps {} / {budget}", status.steps),
		None => format!("Steps {}", status.steps),
	}
}

fn result_message(result: GameResult) -> (&'static str, &'static str) {
	match result {
		GameResult::Win => (
			"Connected!",
			"You connected the players before running out of moves.",
		),
		GameResult::Lose => ("Out of moves", "The target slipped away this time."),
	}
}

/// Endpoints, step counter and, once decided, the result.
#[component]
pub fn GameHeader(
	#[prop(into)] status: Signal<GameStatus>,
	/// Label of the button shown with the result.
	#[prop(into)]
	again_label: String,
	on_again: Callback<()>,
) -> impl IntoView {
	let source_name = move || status.with(|s| s.source.as_ref().map(|e| e.name.clone()));
	let target_name = move || status.with(|s| s.target.as_ref().map(|e| e.name.clone()));

	view! {
		<header class="game-header">
			<div class="endpoints">
				<span class="source">{source_name}</span>
				{move || status.with(|s| s.target.is_some()).then(|| view! { <span class="arrow">"→"</span> })}
				<span class="target">{target_name}</span>
			</div>
			<div class="steps">{move || status.with(steps_label)}</div>
			{move || {
				status
					.with(|s| s.result)
					.map(|result| {
						let (title, detail) = result_message(result);
						let again_label = again_label.clone();
						let won = result == GameResult::Win;
						view! {
							<div class="result" class:win=won>
								<h2>{title}</h2>
								<p>{detail}</p>
								<button on:click=move |_| on_again.run(())>{again_label}</button>
							</div>
						}
					})
			}}
		</header>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn steps_label_shows_budget_when_bounded() {
		let mut status = GameStatus {
			steps: 2,
			max_steps: Some(6),
			..GameStatus::default()
		};
		assert_eq!(steps_label(&status), "Steps 2 / 6");
		status.max_steps = None;
		assert_eq!(steps_label(&status), "Steps 2");
	}
}
