use leptos::prelude::*;
use leptos_router::components::A;

/// 404 page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"Lost the trail"</h1>
			<p>"No page lives at this address."</p>
			<A href="/">"Back to the challenge"</A>
		</div>
	}
}
