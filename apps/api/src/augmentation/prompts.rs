// Prompt templates for the generative backend. Placeholders are replaced with
// `str::replace` before sending.

pub const SKILLS_TO_ADD_TEMPLATE: &str = "\
You are a resume expert. Based on this job description, list the exact skills \
the candidate should add to their resume.

Job Description: {job_description}

Missing Skills: {skills}

Instructions:
- List each skill on its own line starting with a dash (-)
- Use the exact terminology from the job description
- Put the most important skills first
- Keep it to 10 skills at most

Skills list:";

pub const PROFESSIONAL_SUMMARY_TEMPLATE: &str = "\
You are a professional resume writer. Write a professional summary tailored to \
this job.

Job Description: {job_description}

Candidate's Current Resume: {resume}

Key Skills to Include: {skills}

Instructions:
- 3-4 sentences at most
- Open with a clear professional title
- Work the key skills in naturally
- Stay consistent with the candidate's actual background
- Focus on achievements, use active voice

Professional summary:";

pub const EXPERIENCE_BULLETS_TEMPLATE: &str = "\
You are a professional resume writer. Write 4 achievement-oriented bullet points \
for the Experience section that use the missing skills.

Job Description: {job_description}

Missing Skills to Incorporate: {skills}

Instructions:
- Start each bullet with a strong action verb
- Include specific metrics (percentages, amounts, time saved)
- Use past tense, one or two lines per bullet
- Start each bullet with a dash (-)

Bullet points:";

pub const SKILLS_INTEGRATION_TEMPLATE: &str = "\
You are a professional resume writer. Write 2-3 sentences for a Skills section \
that show proficiency in these skills.

Job Requirements: {job_description}

Skills to Showcase: {skills}

Instructions:
- Show proficiency level, not just a list
- Use every skill listed above
- One complete sentence per line

Sentences:";

pub const PROJECT_IDEAS_TEMPLATE: &str = "\
You are a technical career advisor. Suggest 3-4 specific projects that would \
strengthen this candidate's resume for the job.

Job Description: {job_description}

Missing Technical Skills: {skills}

Current Projects: {projects_status}

Instructions:
- Each project uses 2-3 of the missing skills
- Say what the project does and which technologies it uses
- Keep each achievable in 1-2 weeks
- One sentence per project, starting with a dash (-)

Project ideas:";
