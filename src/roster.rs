//! The built-in growth-campaign roster.
//!
//! Nine specialists run in a fixed order, from market research through
//! content and distribution to a closing budget review.
//! Prompts reference the campaign inputs `{brand_name}`, `{niche}`,
//! `{offer_name}`, `{brand_voice}`, `{budget_level}`, `{audience_profile}`
//! and `{objective}`.

use crate::crew::{Agent, Crew, Task};
use crate::tools::{ToolSet, STORYBOARD_TOOL};

impl Crew {
    /// The default growth-campaign crew, without tools registered.
    ///
    /// The visual director asks for [`STORYBOARD_TOOL`]; register a
    /// [`StoryboardTool`](crate::tools::StoryboardTool) with
    /// [`Crew::with_tool`] to let it render.
    pub fn growth_default() -> Crew {
        Crew {
            agents: agents(),
            tasks: tasks(),
            tools: ToolSet::new(),
        }
    }
}

fn agents() -> Vec<Agent> {
    vec![
        Agent::new(
            "competitive_intelligence_analyst",
            "Competitive Intelligence Analyst",
            "Map who {brand_name} competes with in {niche} and where they are weak",
            "You dissect competitor channels, pricing and messaging, and you only \
             report gaps a small team can actually exploit.",
        ),
        Agent::new(
            "trend_forecaster",
            "Trend Forecaster",
            "Spot the topics in {niche} that will peak in the next 90 days",
            "You track search interest, creator chatter and launch calendars and \
             separate durable shifts from one-week noise.",
        ),
        Agent::new(
            "content_strategist",
            "Multi-Platform Content Strategist",
            "Turn insights into a content plan that serves {objective}",
            "You plan pillar pieces and their cut-downs across video, social, \
             blog and email so every asset is reused at least three times.",
        ),
        Agent::new(
            "script_writer",
            "Video Script Writer",
            "Write scripts in a {brand_voice} voice that hold attention past 30 seconds",
            "You write hooks first, cut every line that does not move the viewer, \
             and always end on one clear call to action.",
        ),
        Agent::new(
            "visual_director",
            "Visual Content Director",
            "Storyboard the videos and thumbnails so {offer_name} is instantly legible",
            "You think in frames: composition, contrast and a single focal point. \
             Your briefs go straight to an image model.",
        )
        .with_tools([STORYBOARD_TOOL]),
        Agent::new(
            "seo_specialist",
            "Search & YouTube SEO Specialist",
            "Get {brand_name} content ranking for the searches its audience makes",
            "You research keywords, write titles and descriptions people click, and \
             structure chapters and internal links.",
        ),
        Agent::new(
            "email_funnel_architect",
            "Email Funnel Architect",
            "Convert content viewers into subscribers and buyers of {offer_name}",
            "You build lead magnets, welcome sequences and launch sequences with \
             measurable goals for every email.",
        ),
        Agent::new(
            "monetization_strategist",
            "Monetization Strategist",
            "Find revenue streams that fit a {budget_level} budget",
            "You price offers, pick affiliate and partnership programs, and refuse \
             tactics that erode audience trust.",
        ),
        Agent::new(
            "roi_manager",
            "Cost & ROI Manager",
            "Keep the campaign within a {budget_level} budget while maximizing return",
            "You assign a cost and an expected return to every activity and cut \
             the ones that do not pay for themselves.",
        ),
    ]
}

fn tasks() -> Vec<Task> {
    vec![
        Task::new(
            "competitive_intelligence_analysis",
            "competitive_intelligence_analyst",
            "Analyze the competitive landscape for {brand_name} in {niche}. \
             Audience: {audience_profile}. Identify the top competitors, the \
             channels they win on, and three gaps {brand_name} can own.",
            "A competitor table (name, main channel, strength, weakness) followed \
             by three prioritized opportunity gaps.",
        ),
        Task::new(
            "predict_trending_topics",
            "trend_forecaster",
            "Forecast the topics in {niche} most likely to trend over the next \
             90 days and explain how {brand_name} can ride each one.",
            "Ten topics ranked by expected momentum, each with a one-line angle \
             for {brand_name}.",
        ),
        Task::new(
            "content_plan",
            "content_strategist",
            "Build a four-week content plan serving the objective: {objective}. \
             Use the competitor gaps and trend forecast. Cover video, short-form, \
             blog and email.",
            "A week-by-week calendar listing each asset, its platform, and the \
             pillar piece it derives from.",
        ),
        Task::new(
            "write_video_scripts",
            "script_writer",
            "Write scripts for the three highest-priority videos in the content \
             plan. Voice: {brand_voice}. Feature {offer_name} where natural.",
            "Three scripts, each with a hook, beats with timestamps, and a call to \
             action.",
        ),
        Task::new(
            "design_storyboards",
            "visual_director",
            "For each script, describe a storyboard of four to six frames and one \
             thumbnail. Write every frame as a standalone image-generation prompt \
             with an optional negative prompt. Render the storyboard for the first \
             script with the storyboard generator when it is available.",
            "Per script: a numbered list of frame prompts and negative prompts, \
             plus a thumbnail prompt, and the render result if one was produced.",
        ),
        Task::new(
            "optimize_search",
            "seo_specialist",
            "Produce titles, descriptions, tags and chapters for the scripted \
             videos, and target keywords for the blog posts in the plan.",
            "Per asset: title, description, tags, and the primary keyword it \
             targets.",
        ),
        Task::new(
            "build_email_funnel",
            "email_funnel_architect",
            "Design a lead magnet and a five-email welcome sequence that moves \
             new subscribers toward {offer_name}.",
            "The lead magnet concept and five emails with subject line, goal and \
             body outline.",
        ),
        Task::new(
            "design_monetization",
            "monetization_strategist",
            "Recommend monetization streams for {brand_name} that fit a \
             {budget_level} budget: pricing for {offer_name}, affiliate \
             programs and partnerships.",
            "A ranked list of revenue streams with estimated effort and return.",
        ),
        Task::new(
            "optimize_costs_roi",
            "roi_manager",
            "Review every activity proposed so far and build a budget for a \
             {budget_level} team. Cut or defer anything with weak expected \
             return.",
            "A budget table (activity, cost, expected return, keep/cut) and a \
             final 30-day action list.",
        ),
    ]
}
