//! An in-process store used by tests.
//!
//! It mirrors the PostgreSQL queries row for row and counts every repository
//! call, so tests can check how many round trips an operation costs.

use std::{
	collections::HashMap,
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc, RwLock, RwLockReadGuard, RwLockWriteGuard,
	},
};

use chrono::{Datelike, Duration, TimeZone, Utc};
use uuid::Uuid;

use super::{
	AuthorRepository, CommentRepository, Error, PostRepository, Result, Store, TagRepository,
};
use crate::{
	model::{Author, Comment, NewComment, NewPost, Post, Tag},
	query::{PostOrder, PostQuery, TagOrder, TagQuery},
};

#[derive(Default)]
struct Data {
	authors: Vec<Author>,
	tags: Vec<Tag>,
	posts: Vec<Post>,
	/// (post, tag)
	post_tags: Vec<(Uuid, Uuid)>,
	/// (post, user)
	likes: Vec<(Uuid, Uuid)>,
	comments: Vec<Comment>,
}

impl Data {
	fn posts_count(&self, tag_id: Uuid) -> i64 {
		count(self.post_tags.iter().filter(|(_, tag)| *tag == tag_id))
	}

	fn likes_count(&self, post_id: Uuid) -> i64 {
		count(self.likes.iter().filter(|(post, _)| *post == post_id))
	}

	fn has_post(&self, post_id: Uuid) -> bool {
		self.posts.iter().any(|post| post.id == post_id)
	}

	fn has_author(&self, author_id: Uuid) -> bool {
		self.authors.iter().any(|author| author.id == author_id)
	}

	fn annotated_tag(&self, tag: &Tag) -> Tag {
		Tag {
			posts_count: Some(self.posts_count(tag.id)),
			..tag.clone()
		}
	}
}

fn count<I: Iterator>(iter: I) -> i64 {
	i64::try_from(iter.count()).unwrap()
}

fn truncate<T>(items: &mut Vec<T>, limit: Option<i64>) {
	if let Some(limit) = limit {
		items.truncate(usize::try_from(limit).unwrap_or(0));
	}
}

#[derive(Default)]
pub struct MemoryStore {
	data: RwLock<Data>,
	queries: AtomicUsize,
}

impl MemoryStore {
	/// Number of repository calls served so far.
	pub fn queries(&self) -> usize {
		self.queries.load(Ordering::SeqCst)
	}

	fn read(&self) -> RwLockReadGuard<'_, Data> {
		self.queries.fetch_add(1, Ordering::SeqCst);
		self.data.read().unwrap()
	}

	fn write(&self) -> RwLockWriteGuard<'_, Data> {
		self.queries.fetch_add(1, Ordering::SeqCst);
		self.data.write().unwrap()
	}

	pub fn insert_author(&self, username: &str, is_staff: bool) -> Author {
		let author = Author {
			id: Uuid::new_v4(),
			username: username.into(),
			is_staff,
		};

		self.data.write().unwrap().authors.push(author.clone());
		author
	}

	pub fn insert_tag(&self, title: &str) -> Tag {
		let tag = Tag {
			id: Uuid::new_v4(),
			title: Tag::normalize_title(title),
			posts_count: None,
		};

		self.data.write().unwrap().tags.push(tag.clone());
		tag
	}

	/// Inserts a post published at noon UTC on the given date.
	pub fn insert_post(
		&self,
		slug: &str,
		author_id: Uuid,
		tag_ids: &[Uuid],
		(year, month, day): (i32, u32, u32),
	) -> Post {
		let post = Post {
			id: Uuid::new_v4(),
			title: slug.replace('-', " "),
			text: format!("The full text of {slug}."),
			slug: slug.into(),
			image: None,
			published_at: Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap(),
			author_id,
			likes_count: None,
			comments_count: None,
			tags: None,
			author: None,
		};

		let mut data = self.data.write().unwrap();

		data.posts.push(post.clone());
		data.post_tags
			.extend(tag_ids.iter().map(|tag_id| (post.id, *tag_id)));

		post
	}

	pub fn insert_like(&self, post_id: Uuid, user_id: Uuid) {
		self.data.write().unwrap().likes.push((post_id, user_id));
	}

	/// Inserts a comment published one minute after the previous one.
	pub fn insert_comment(&self, post_id: Uuid, author_id: Uuid, text: &str) -> Comment {
		let mut data = self.data.write().unwrap();
		let offset = Duration::minutes(i64::try_from(data.comments.len()).unwrap());
		let comment = Comment {
			id: Uuid::new_v4(),
			post_id,
			author_id,
			text: text.into(),
			published_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + offset,
		};

		data.comments.push(comment.clone());
		comment
	}
}

#[axum::async_trait]
impl PostRepository for MemoryStore {
	async fn fetch(&self, query: &PostQuery) -> Result<Vec<Post>> {
		let data = self.read();

		let mut posts = data
			.posts
			.iter()
			.filter(|post| query.slug.as_ref().map_or(true, |slug| &post.slug == slug))
			.filter(|post| {
				query
					.tag_id
					.map_or(true, |tag_id| data.post_tags.contains(&(post.id, tag_id)))
			})
			.filter(|post| query.year.map_or(true, |year| post.published_at.year() == year))
			.cloned()
			.map(|mut post| {
				if query.counts_likes() {
					post.likes_count = Some(data.likes_count(post.id));
				}

				post
			})
			.collect::<Vec<_>>();

		match query.order {
			PostOrder::Newest => posts.sort_by(|a, b| {
				b.published_at
					.cmp(&a.published_at)
					.then_with(|| a.id.cmp(&b.id))
			}),
			PostOrder::Oldest => posts.sort_by(|a, b| {
				a.published_at
					.cmp(&b.published_at)
					.then_with(|| a.id.cmp(&b.id))
			}),
			PostOrder::Popular => posts.sort_by(|a, b| {
				b.likes_count
					.cmp(&a.likes_count)
					.then_with(|| b.published_at.cmp(&a.published_at))
					.then_with(|| a.id.cmp(&b.id))
			}),
		}

		truncate(&mut posts, query.limit);

		Ok(posts)
	}

	async fn count_likes(&self, post_id: Uuid) -> Result<i64> {
		Ok(self.read().likes_count(post_id))
	}

	async fn create(&self, input: NewPost) -> Result<Post> {
		let mut data = self.write();

		if data.posts.iter().any(|post| post.slug == input.slug) {
			return Err(Error::Conflict("slug"));
		}

		if !data.has_author(input.author_id)
			|| !input
				.tag_ids
				.iter()
				.all(|tag_id| data.tags.iter().any(|tag| tag.id == *tag_id))
		{
			return Err(Error::MissingReference);
		}

		let post = Post {
			id: Uuid::new_v4(),
			title: input.title,
			text: input.text,
			slug: input.slug,
			image: input.image,
			published_at: input.published_at,
			author_id: input.author_id,
			likes_count: None,
			comments_count: None,
			tags: None,
			author: None,
		};

		data.posts.push(post.clone());
		data.post_tags
			.extend(input.tag_ids.iter().map(|tag_id| (post.id, *tag_id)));

		Ok(post)
	}

	async fn like(&self, post_id: Uuid, user_id: Uuid) -> Result<()> {
		let mut data = self.write();

		if !data.has_post(post_id) || !data.has_author(user_id) {
			return Err(Error::MissingReference);
		}

		if !data.likes.contains(&(post_id, user_id)) {
			data.likes.push((post_id, user_id));
		}

		Ok(())
	}

	async fn delete(&self, post_id: Uuid) -> Result<bool> {
		let mut data = self.write();

		if !data.has_post(post_id) {
			return Ok(false);
		}

		data.posts.retain(|post| post.id != post_id);
		data.post_tags.retain(|(post, _)| *post != post_id);
		data.likes.retain(|(post, _)| *post != post_id);
		data.comments.retain(|comment| comment.post_id != post_id);

		Ok(true)
	}
}

#[axum::async_trait]
impl TagRepository for MemoryStore {
	async fn fetch(&self, query: &TagQuery) -> Result<Vec<Tag>> {
		let data = self.read();

		let mut tags = data
			.tags
			.iter()
			.filter(|tag| {
				query
					.titles
					.as_ref()
					.map_or(true, |titles| titles.contains(&tag.title))
			})
			.map(|tag| data.annotated_tag(tag))
			.collect::<Vec<_>>();

		match query.order {
			TagOrder::Title => tags.sort_by(|a, b| a.title.cmp(&b.title)),
			TagOrder::Popular => tags.sort_by(|a, b| {
				b.posts_count
					.cmp(&a.posts_count)
					.then_with(|| a.title.cmp(&b.title))
			}),
		}

		truncate(&mut tags, query.limit);

		Ok(tags)
	}

	async fn for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Tag>>> {
		let data = self.read();
		let mut tags_for_post = HashMap::new();

		for post_id in post_ids {
			let mut tags = data
				.post_tags
				.iter()
				.filter(|(post, _)| post == post_id)
				.filter_map(|(_, tag_id)| data.tags.iter().find(|tag| tag.id == *tag_id))
				.map(|tag| data.annotated_tag(tag))
				.collect::<Vec<_>>();

			if tags.is_empty() {
				continue;
			}

			tags.sort_by(|a, b| a.title.cmp(&b.title));
			tags_for_post.insert(*post_id, tags);
		}

		Ok(tags_for_post)
	}

	async fn create(&self, title: String) -> Result<Tag> {
		let mut data = self.write();

		if data.tags.iter().any(|tag| tag.title == title) {
			return Err(Error::Conflict("title"));
		}

		let tag = Tag {
			id: Uuid::new_v4(),
			title,
			posts_count: None,
		};

		data.tags.push(tag.clone());

		Ok(Tag {
			posts_count: Some(0),
			..tag
		})
	}
}

#[axum::async_trait]
impl CommentRepository for MemoryStore {
	async fn count_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>> {
		let data = self.read();

		Ok(post_ids
			.iter()
			.filter(|post_id| data.has_post(**post_id))
			.map(|post_id| {
				let comments = data
					.comments
					.iter()
					.filter(|comment| comment.post_id == *post_id);

				(*post_id, count(comments))
			})
			.collect())
	}

	async fn for_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
		let data = self.read();

		let mut comments = data
			.comments
			.iter()
			.filter(|comment| comment.post_id == post_id)
			.cloned()
			.collect::<Vec<_>>();

		comments.sort_by(|a, b| {
			a.published_at
				.cmp(&b.published_at)
				.then_with(|| a.id.cmp(&b.id))
		});

		Ok(comments)
	}

	async fn create(&self, input: NewComment) -> Result<Comment> {
		let mut data = self.write();

		if !data.has_post(input.post_id) || !data.has_author(input.author_id) {
			return Err(Error::MissingReference);
		}

		let comment = Comment {
			id: Uuid::new_v4(),
			post_id: input.post_id,
			author_id: input.author_id,
			text: input.text,
			published_at: input.published_at,
		};

		data.comments.push(comment.clone());

		Ok(comment)
	}
}

#[axum::async_trait]
impl AuthorRepository for MemoryStore {
	async fn by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Author>> {
		let data = self.read();

		Ok(data
			.authors
			.iter()
			.filter(|author| ids.contains(&author.id))
			.map(|author| (author.id, author.clone()))
			.collect())
	}
}

/// A small blog shared by tests.
///
/// Likes per post: `most-liked` 3, `second` 2, `third` 1, the rest 0.
/// Posts per tag: `python` 4, `rust` 3, `django` 2.
pub struct Fixture {
	pub memory: Arc<MemoryStore>,
	pub editor: Author,
	pub readers: Vec<Author>,
	pub tags: HashMap<&'static str, Tag>,
	pub posts: Vec<Post>,
}

impl Fixture {
	pub fn new() -> Self {
		let memory = MemoryStore::default();

		let editor = memory.insert_author("editor", true);
		let readers = (1..=3)
			.map(|n| memory.insert_author(&format!("reader{n}"), false))
			.collect::<Vec<_>>();

		let tags = ["python", "django", "rust"]
			.into_iter()
			.map(|title| (title, memory.insert_tag(title)))
			.collect::<HashMap<_, _>>();
		let tag = |title: &str| tags[title].id;

		let posts = vec![
			memory.insert_post(
				"most-liked",
				editor.id,
				&[tag("python"), tag("django")],
				(2023, 3, 1),
			),
			memory.insert_post("second", editor.id, &[tag("python")], (2023, 1, 15)),
			memory.insert_post("third", editor.id, &[tag("rust")], (2022, 12, 31)),
			memory.insert_post(
				"fresh",
				editor.id,
				&[tag("rust"), tag("python")],
				(2024, 2, 10),
			),
			memory.insert_post("old", editor.id, &[tag("django")], (2021, 6, 1)),
			memory.insert_post("mid-year", editor.id, &[tag("python")], (2023, 7, 4)),
			memory.insert_post("year-end", editor.id, &[tag("rust")], (2023, 12, 31)),
		];

		for (post, likes) in posts.iter().zip([3, 2, 1]) {
			for reader in readers.iter().take(likes) {
				memory.insert_like(post.id, reader.id);
			}
		}

		for text in ["first!", "great read", "thanks"] {
			memory.insert_comment(posts[0].id, readers[0].id, text);
		}
		memory.insert_comment(posts[1].id, readers[1].id, "nice");

		Self {
			memory: Arc::new(memory),
			editor,
			readers,
			tags,
			posts,
		}
	}

	pub fn store(&self) -> Store {
		Store::from_backend(self.memory.clone())
	}
}
