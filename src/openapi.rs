use aide::{openapi::Tag, transform::TransformOpenApi};

use crate::{error, extract::Json};

pub mod tag {
	pub const BLOG: &str = "Blog";
	pub const POST: &str = "Post";
	pub const TAG: &str = "Tag";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Blog Open API")
		.summary("Blog pages, posts and tags")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::BLOG.into(),
			description: Some("Page contexts for the blog front-end".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::POST.into(),
			description: Some("Post management, likes and comments".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::TAG.into(),
			description: Some("Tag management".into()),
			..Default::default()
		})
		.default_response_with::<Json<Vec<error::Message>>, _>(|res| {
			res.example(
				error::Message::new("unknown_post")
					.detail("slug", "hello-world")
					.into_vec(),
			)
		})
}
